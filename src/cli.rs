//! Command-line interface for modelroute
//!
//! Provides argument parsing and subcommand handling for the modelroute binary.

use clap::{Parser, Subcommand};

/// Per-task model resolution and Ollama pre-flight checks
#[derive(Parser)]
#[command(name = "modelroute")]
#[command(version)]
#[command(about = "Per-task model resolution and Ollama pre-flight checks")]
#[command(
    long_about = "modelroute decides which provider and model each agent pipeline task uses, \
    falling back from hosted providers to a local Ollama server, and checks that Ollama \
    is reachable before it is used."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "modelroute.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Print the model a task resolves to
    Resolve {
        /// Task: planner, programmer, reviewer, router, summarizer
        task: String,
        /// Pin a provider: openai, anthropic, google-genai, ollama
        #[arg(short, long)]
        provider: Option<String>,
        /// Explicit model name (requires --provider)
        #[arg(short, long, requires = "provider")]
        model: Option<String>,
    },
    /// Check Ollama connectivity and list its models
    Probe {
        /// Base URL to probe instead of the configured one
        #[arg(short, long)]
        base_url: Option<String>,
    },
    /// Classify a provider error message
    Classify {
        /// Raw error text
        message: String,
    },
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# modelroute Configuration
# =========================
#
# Every section is optional. Environment variables override file values:
#   OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_API_KEY, OLLAMA_API_BASE

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
host = "127.0.0.1"
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# PROVIDERS
# ─────────────────────────────────────────────────────────────────────────────
#
# Providers are tried in this fixed order when a task has no explicit model:
#
#   openai → anthropic → google-genai → ollama
#
# A hosted provider is used only if it has a non-empty API key.
# Ollama needs no key and is the last resort.

[providers.openai]
# api_key = "sk-..."

[providers.anthropic]
# api_key = "sk-ant-..."

[providers.google-genai]
# api_key = "..."

[providers.ollama]
enabled = true
base_url = "http://localhost:11434"

# ─────────────────────────────────────────────────────────────────────────────
# TASK OVERRIDES
# ─────────────────────────────────────────────────────────────────────────────
#
# "provider:model" pins a task to an exact model and skips the fallback walk.

[tasks]
# planner = "anthropic:claude-sonnet-4-0"
# summarizer = "ollama:deepseek-r1:1.5b"

# ─────────────────────────────────────────────────────────────────────────────
# PROBE
# ─────────────────────────────────────────────────────────────────────────────

[probe]
# Seconds before an Ollama probe gives up (1-300). Unset: transport default.
# timeout_seconds = 5

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
