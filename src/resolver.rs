//! Model resolution
//!
//! Turns a task plus optional explicit configuration into a concrete
//! [`ModelConfig`]. Resolution is a configuration decision only: it never
//! probes the network. Callers wanting a pre-flight check use
//! [`crate::probe`] separately.

use crate::config::{Config, ProvidersConfig, TaskOverrides};
use crate::error::{AppError, AppResult};
use crate::providers::{
    FallbackOrder, ModelConfig, PROVIDER_FALLBACK_ORDER, Provider, ProviderSet, Task,
    default_model_for_provider,
};

/// Connection parameters resolved for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
struct Connection {
    base_url: Option<String>,
    api_key: String,
}

/// Resolves per-task model configuration
///
/// Holds an immutable snapshot of provider settings taken at construction, so
/// concurrent resolutions need no synchronization.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    providers: ProvidersConfig,
    overrides: TaskOverrides,
    order: FallbackOrder,
}

impl ModelResolver {
    /// Build a resolver from validated configuration
    ///
    /// # Errors
    /// Returns `AppError::Config` if the fallback order fails verification.
    pub fn new(config: &Config) -> AppResult<Self> {
        let order = FallbackOrder::verify(&PROVIDER_FALLBACK_ORDER)?;
        Ok(Self {
            providers: config.providers.clone(),
            overrides: config.tasks.clone(),
            order,
        })
    }

    /// The provider order this resolver walks
    pub fn fallback_order(&self) -> FallbackOrder {
        self.order
    }

    /// Effective Ollama base URL (configured, or the local default)
    pub fn ollama_base_url(&self) -> &str {
        self.providers.ollama.base_url()
    }

    /// Connection parameters if the provider is usable
    ///
    /// Hosted providers need a non-empty API key. Ollama needs only to be
    /// enabled and accepts an empty key.
    fn connection(&self, provider: Provider) -> Option<Connection> {
        match self.providers.hosted(provider) {
            Some(hosted) => hosted.api_key().map(|key| Connection {
                base_url: hosted
                    .base_url
                    .clone()
                    .filter(|url| !url.trim().is_empty()),
                api_key: key.to_string(),
            }),
            None if self.providers.ollama.enabled => Some(Connection {
                base_url: Some(self.providers.ollama.base_url().to_string()),
                api_key: self.providers.ollama.api_key().to_string(),
            }),
            None => None,
        }
    }

    /// Whether a provider can be selected with the current configuration
    pub fn is_usable(&self, provider: Provider) -> bool {
        self.connection(provider).is_some()
    }

    /// Resolve the model for a task
    ///
    /// A fully specified `explicit` config is returned unchanged. A partial
    /// one (empty model name) moves its provider to the front of the walk.
    /// Otherwise the fallback order is walked from index 0 and the first
    /// usable provider's default model is returned.
    ///
    /// # Errors
    /// `AppError::NoUsableProvider` when no provider in the walk is usable.
    pub fn resolve(&self, task: Task, explicit: Option<&ModelConfig>) -> AppResult<ModelConfig> {
        self.resolve_excluding(task, explicit, &ProviderSet::new())
    }

    /// Resolve using the configured per-task override
    ///
    /// Unlike a caller-supplied config, an override is completed with the
    /// provider's configured base URL and API key. An override naming an
    /// unusable provider falls back through the normal order.
    pub fn resolve_configured(&self, task: Task) -> AppResult<ModelConfig> {
        let Some(mut configured) = self.overrides.get(task)? else {
            return self.resolve(task, None);
        };
        if !configured.is_fully_specified() {
            return self.resolve(task, Some(&configured));
        }

        match self.connection(configured.provider) {
            Some(connection) => {
                configured.base_url = connection.base_url;
                configured.api_key = Some(connection.api_key);
                tracing::info!(
                    task = %task,
                    provider = %configured.provider,
                    model = %configured.model_name,
                    "Resolved configured task override"
                );
                Ok(configured)
            }
            None => {
                tracing::warn!(
                    task = %task,
                    provider = %configured.provider,
                    model = %configured.model_name,
                    "Configured override names an unusable provider, using fallback order"
                );
                self.resolve(task, None)
            }
        }
    }

    /// Like [`resolve`](Self::resolve), skipping providers in `excluded`
    ///
    /// Callers use this to move past a provider that failed at call time;
    /// resolution itself never retries. An explicit config whose provider is
    /// excluded is ignored and the order is walked without it.
    pub fn resolve_excluding(
        &self,
        task: Task,
        explicit: Option<&ModelConfig>,
        excluded: &ProviderSet,
    ) -> AppResult<ModelConfig> {
        if let Some(explicit) =
            explicit.filter(|c| c.is_fully_specified() && !excluded.contains(&c.provider))
        {
            tracing::debug!(
                task = %task,
                provider = %explicit.provider,
                model = %explicit.model_name,
                "Using explicit model configuration"
            );
            return Ok(explicit.clone());
        }

        let walk = match explicit {
            Some(partial) => self.order.pinned(partial.provider),
            None => self.order.providers().to_vec(),
        };

        let mut tried = Vec::with_capacity(walk.len());
        for provider in walk {
            if excluded.contains(&provider) {
                tracing::debug!(task = %task, provider = %provider, "Provider excluded by caller");
                continue;
            }
            tried.push(provider.as_str());

            let Some(connection) = self.connection(provider) else {
                tracing::debug!(
                    task = %task,
                    provider = %provider,
                    "Skipping unusable provider"
                );
                continue;
            };

            let mut config = default_model_for_provider(provider, task);
            config.base_url = connection.base_url;
            config.api_key = Some(connection.api_key);

            tracing::info!(
                task = %task,
                provider = %provider,
                model = %config.model_name,
                "Resolved default model"
            );
            return Ok(config);
        }

        tracing::error!(task = %task, tried = ?tried, "No usable provider in fallback order");
        Err(AppError::NoUsableProvider {
            task: task.to_string(),
            tried: tried.join(", "),
        })
    }
}
