//! Provider, task and model configuration types
//!
//! Closed sets of providers and pipeline tasks, the resolved [`ModelConfig`],
//! the fixed provider fallback order and the per-task default model table.

pub mod defaults;
pub mod fallback;

pub use defaults::{DEFAULT_OLLAMA_BASE_URL, default_model_for_provider};
pub use fallback::{FallbackOrder, PROVIDER_FALLBACK_ORDER, ProviderSet};

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language-model backend
///
/// Ordering among providers is defined by [`PROVIDER_FALLBACK_ORDER`], not by
/// declaration order or name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "google-genai")]
    GoogleGenAi,
    /// Self-hosted Ollama server, no API key required
    #[serde(rename = "ollama")]
    Ollama,
}

impl Provider {
    /// Every provider, in declaration order
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::GoogleGenAi,
        Provider::Ollama,
    ];

    /// Convert to string representation for logging, metrics and parsing
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::GoogleGenAi => "google-genai",
            Self::Ollama => "ollama",
        }
    }

    /// Whether this provider runs on infrastructure the user controls
    ///
    /// Self-hosted providers accept an empty API key.
    pub fn is_self_hosted(&self) -> bool {
        matches!(self, Self::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown provider: '{}'. Supported: openai, anthropic, google-genai, ollama",
                    s
                ))
            })
    }
}

/// Pipeline stage that needs a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Planner,
    Programmer,
    Reviewer,
    Router,
    Summarizer,
}

impl Task {
    /// Every task, in pipeline order
    pub const ALL: [Task; 5] = [
        Task::Planner,
        Task::Programmer,
        Task::Reviewer,
        Task::Router,
        Task::Summarizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Programmer => "programmer",
            Self::Reviewer => "reviewer",
            Self::Router => "router",
            Self::Summarizer => "summarizer",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown task: '{}'. Supported: planner, programmer, reviewer, router, summarizer",
                    s
                ))
            })
    }
}

/// Resolved provider, model and connection parameters for one task invocation
///
/// `provider` and `model_name` are always present. The API key is never
/// serialized and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ModelConfig {
    /// Create a config with no connection parameters
    pub fn new(provider: Provider, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            base_url: None,
            api_key: None,
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// True when both provider and a non-empty model name are present
    pub fn is_fully_specified(&self) -> bool {
        !self.model_name.trim().is_empty()
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parses `provider:model`
///
/// Splits at the first `:` only, since Ollama model names carry their own tag
/// (`ollama:qwen2.5:7b`). A bare provider name yields an empty model name,
/// which pins the provider without fixing a model.
impl FromStr for ModelConfig {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (provider, model) = s.split_once(':').unwrap_or((s, ""));
        let provider = provider.parse::<Provider>()?;
        Ok(Self::new(provider, model.trim()))
    }
}

/// Redact all but the tail of a secret for display
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_provider_serde_names() {
        assert_eq!(
            serde_json::to_string(&Provider::GoogleGenAi).unwrap(),
            r#""google-genai""#
        );
        assert_eq!(
            serde_json::from_str::<Provider>(r#""ollama""#).unwrap(),
            Provider::Ollama
        );
    }

    #[test]
    fn test_unknown_provider_is_validation_error() {
        let err = "mistral".parse::<Provider>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("mistral"));
    }

    #[test]
    fn test_task_parse_is_case_sensitive() {
        assert_eq!("planner".parse::<Task>().unwrap(), Task::Planner);
        assert!("Planner".parse::<Task>().is_err());
    }

    #[test]
    fn test_only_ollama_is_self_hosted() {
        let self_hosted: Vec<_> = Provider::ALL
            .into_iter()
            .filter(Provider::is_self_hosted)
            .collect();
        assert_eq!(self_hosted, vec![Provider::Ollama]);
    }

    #[test]
    fn test_model_config_parses_ollama_tagged_model() {
        let config: ModelConfig = "ollama:qwen2.5:7b".parse().unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.model_name, "qwen2.5:7b");
        assert!(config.is_fully_specified());
    }

    #[test]
    fn test_model_config_bare_provider_is_partial() {
        let config: ModelConfig = "anthropic".parse().unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert!(!config.is_fully_specified());
    }

    #[test]
    fn test_model_config_debug_redacts_api_key() {
        let config = ModelConfig::new(Provider::OpenAi, "o3").with_api_key("sk-very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_model_config_never_serializes_api_key() {
        let config = ModelConfig::new(Provider::Ollama, "llama3.2:latest")
            .with_base_url("http://localhost:11434")
            .with_api_key("");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["provider"], "ollama");
        assert_eq!(json["base_url"], "http://localhost:11434");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("sk-1234567890abcd"), "****abcd");
    }
}
