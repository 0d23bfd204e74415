//! modelroute - per-task model resolution for multi-task agent pipelines
//!
//! Decides which provider and model each pipeline task uses, honoring
//! explicit overrides and falling back through a fixed provider order that
//! ends at a self-hosted Ollama server. Also provides advisory connectivity
//! and model discovery probes for Ollama, and a classifier turning raw
//! provider errors into fixed user-facing advice.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod probe;
pub mod providers;
pub mod resolver;
pub mod telemetry;

pub use classify::{ErrorCategory, ProviderFailure, classify};
pub use error::{AppError, AppResult};
pub use probe::{ModelServerProbe, OllamaProbe, get_available_models, test_connection};
pub use providers::{ModelConfig, Provider, Task, default_model_for_provider};
pub use resolver::ModelResolver;
