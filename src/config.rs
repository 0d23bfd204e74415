//! Configuration management for modelroute
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Environment variables are applied explicitly through [`Config::apply_env`];
//! nothing in the library reads the process environment on its own.

use crate::error::{AppError, AppResult};
use crate::providers::{DEFAULT_OLLAMA_BASE_URL, ModelConfig, Provider, Task};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding the Ollama base URL
pub const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_API_BASE";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Upper bound for the probe timeout, in seconds
const MAX_PROBE_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub tasks: TaskOverrides,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Connection settings for every provider
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: HostedProviderConfig,
    #[serde(default)]
    pub anthropic: HostedProviderConfig,
    #[serde(default, rename = "google-genai")]
    pub google_genai: HostedProviderConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Hosted provider credentials
///
/// A hosted provider is usable only when `api_key` is non-empty.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct HostedProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Custom endpoint; absent means the provider SDK default
    #[serde(default)]
    pub base_url: Option<String>,
}

impl HostedProviderConfig {
    /// Non-empty API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Debug for HostedProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Self-hosted Ollama settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    /// Set to false to take Ollama out of the fallback walk
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base URL; absent means [`DEFAULT_OLLAMA_BASE_URL`]
    #[serde(default)]
    pub base_url: Option<String>,
    /// Optional key for authenticating proxies; empty is accepted
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
            api_key: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl OllamaConfig {
    /// Effective base URL
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_OLLAMA_BASE_URL)
    }

    /// Effective API key, empty when unset
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}

impl ProvidersConfig {
    /// Hosted settings for a hosted provider, `None` for Ollama
    pub fn hosted(&self, provider: Provider) -> Option<&HostedProviderConfig> {
        match provider {
            Provider::OpenAi => Some(&self.openai),
            Provider::Anthropic => Some(&self.anthropic),
            Provider::GoogleGenAi => Some(&self.google_genai),
            Provider::Ollama => None,
        }
    }

    /// Explicitly set base URLs; blank values mean "use the default"
    fn base_urls(&self) -> impl Iterator<Item = (Provider, &str)> {
        Provider::ALL.into_iter().filter_map(move |p| {
            let url = match self.hosted(p) {
                Some(hosted) => hosted.base_url.as_deref(),
                None => self.ollama.base_url.as_deref(),
            };
            url.filter(|u| !u.trim().is_empty()).map(|u| (p, u))
        })
    }
}

/// Per-task explicit model selections, written as `provider:model`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskOverrides {
    #[serde(default)]
    pub planner: Option<String>,
    #[serde(default)]
    pub programmer: Option<String>,
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub router: Option<String>,
    #[serde(default)]
    pub summarizer: Option<String>,
}

impl TaskOverrides {
    fn raw(&self, task: Task) -> Option<&str> {
        match task {
            Task::Planner => self.planner.as_deref(),
            Task::Programmer => self.programmer.as_deref(),
            Task::Reviewer => self.reviewer.as_deref(),
            Task::Router => self.router.as_deref(),
            Task::Summarizer => self.summarizer.as_deref(),
        }
    }

    /// Parsed override for a task
    ///
    /// Validated on load, so a parse failure here means the config was
    /// built without [`Config::validate`].
    pub fn get(&self, task: Task) -> AppResult<Option<ModelConfig>> {
        self.raw(task).map(ModelConfig::from_str).transpose()
    }
}

/// Probe settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Request timeout for probes; absent leaves timeouts to the transport
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Overlay environment values onto this config
    ///
    /// `lookup` returns the value of a variable, or `None` when unset.
    /// Set, non-empty values win over the file.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(OLLAMA_BASE_URL_ENV) {
            tracing::debug!(base_url = %url, "Using Ollama base URL from {}", OLLAMA_BASE_URL_ENV);
            self.providers.ollama.base_url = Some(url);
        }

        for (env, hosted) in [
            (OPENAI_API_KEY_ENV, &mut self.providers.openai),
            (ANTHROPIC_API_KEY_ENV, &mut self.providers.anthropic),
            (GOOGLE_API_KEY_ENV, &mut self.providers.google_genai),
        ] {
            if let Some(key) = get(env) {
                tracing::debug!("Using API key from {}", env);
                hosted.api_key = Some(key);
            }
        }

        self
    }

    /// Overlay the current process environment
    pub fn apply_process_env(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()`, but can also be called
    /// explicitly when constructing Config via other means (e.g., in tests or
    /// after [`Config::apply_env`]).
    pub fn validate(&self) -> AppResult<()> {
        for (provider, url) in self.providers.base_urls() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "providers.{}.base_url '{}' must start with 'http://' or 'https://'",
                    provider, url
                )));
            }
        }

        if let Some(timeout) = self.probe.timeout_seconds
            && (timeout == 0 || timeout > MAX_PROBE_TIMEOUT_SECONDS)
        {
            return Err(AppError::Config(format!(
                "probe.timeout_seconds must be in 1..={}, got {}",
                MAX_PROBE_TIMEOUT_SECONDS, timeout
            )));
        }

        for task in Task::ALL {
            match self.tasks.get(task) {
                Ok(Some(model)) if !model.is_fully_specified() => {
                    return Err(AppError::Config(format!(
                        "tasks.{} must be 'provider:model', got '{}'",
                        task, model.provider
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(AppError::Config(format!("tasks.{}: {}", task, e)));
                }
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    /// Parse and validate configuration from a TOML string
    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| AppError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
