//! Per-task default model table
//!
//! Larger general-purpose models serve planning and code generation; smaller,
//! faster models serve review, routing and summarization.

use super::{ModelConfig, Provider, Task};

/// Base URL used for Ollama when neither config nor environment provides one
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Mid-size general model for planning and code generation
pub const OLLAMA_GENERAL_MODEL: &str = "qwen2.5:7b";
/// Small fast model for review and routing
pub const OLLAMA_FAST_MODEL: &str = "llama3.2:latest";
/// Small reasoning model for summarization
pub const OLLAMA_REASONING_MODEL: &str = "deepseek-r1:1.5b";

/// Default model name for a (provider, task) pair
///
/// Exhaustive over `Provider × Task`; adding a provider or task without
/// extending this table does not compile.
pub fn default_model_name(provider: Provider, task: Task) -> &'static str {
    match (provider, task) {
        (Provider::Anthropic, Task::Router) => "claude-3-5-haiku-latest",
        (
            Provider::Anthropic,
            Task::Planner | Task::Programmer | Task::Reviewer | Task::Summarizer,
        ) => "claude-sonnet-4-0",

        (Provider::OpenAi, Task::Planner | Task::Reviewer) => "o3",
        (Provider::OpenAi, Task::Programmer) => "gpt-4.1",
        (Provider::OpenAi, Task::Router) => "gpt-4.1-nano",
        (Provider::OpenAi, Task::Summarizer) => "gpt-4.1-mini",

        (Provider::GoogleGenAi, Task::Programmer | Task::Summarizer) => "gemini-2.5-pro",
        (Provider::GoogleGenAi, Task::Planner | Task::Reviewer | Task::Router) => {
            "gemini-2.5-flash"
        }

        (Provider::Ollama, Task::Planner | Task::Programmer) => OLLAMA_GENERAL_MODEL,
        (Provider::Ollama, Task::Reviewer | Task::Router) => OLLAMA_FAST_MODEL,
        (Provider::Ollama, Task::Summarizer) => OLLAMA_REASONING_MODEL,
    }
}

/// Default model configuration for a provider and task
///
/// Pure and total: the result always carries the requested provider and a
/// non-empty model name. Connection parameters are left unset; the resolver
/// fills them from configuration.
pub fn default_model_for_provider(provider: Provider, task: Task) -> ModelConfig {
    ModelConfig::new(provider, default_model_name(provider, task))
}
