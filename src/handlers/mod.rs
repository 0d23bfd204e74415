//! HTTP request handlers for the modelroute API

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::probe::OllamaProbe;
use crate::resolver::ModelResolver;
use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod metrics;
pub mod ollama;
pub mod resolve;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    resolver: Arc<ModelResolver>,
    probe: Arc<OllamaProbe>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// # Errors
    /// Fails if the fallback order does not verify, the HTTP client cannot be
    /// built, or metrics registration fails.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let resolver = ModelResolver::new(&config)?;
        let probe = match config.probe.timeout() {
            Some(timeout) => OllamaProbe::with_timeout(timeout)?,
            None => OllamaProbe::new()?,
        };
        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to register metrics: {}", e)))?;

        Ok(Self {
            config,
            resolver: Arc::new(resolver),
            probe: Arc::new(probe),
            metrics: Arc::new(metrics),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &ModelResolver {
        &self.resolver
    }

    pub fn probe(&self) -> &OllamaProbe {
        &self.probe
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the application router with middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/resolve/{task}", get(resolve::handler))
        .route("/providers/ollama/status", get(ollama::status_handler))
        .route("/providers/ollama/models", get(ollama::models_handler))
        .route("/metrics", get(metrics::handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_appstate_new_creates_state() {
        let config = Config::from_str("[server]\nport = 4000\n").unwrap();
        let state = AppState::new(Arc::new(config)).expect("should create AppState");
        assert_eq!(state.config().server.port, 4000);
        assert_eq!(
            state.resolver().ollama_base_url(),
            crate::providers::DEFAULT_OLLAMA_BASE_URL
        );
    }

    #[test]
    fn test_appstate_is_clonable() {
        let state = AppState::new(Arc::new(Config::default())).unwrap();
        let state2 = state.clone();
        assert_eq!(state2.config().server.port, 3000);
    }

    #[test]
    fn test_appstate_with_probe_timeout() {
        let config = Config::from_str("[probe]\ntimeout_seconds = 2\n").unwrap();
        assert!(AppState::new(Arc::new(config)).is_ok());
    }
}
