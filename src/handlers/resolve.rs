//! Model resolution endpoint
//!
//! `GET /resolve/{task}?provider=&model=` returns the model a task would use.

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::metrics::log_recording_failure;
use crate::providers::{ModelConfig, Provider, Task};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

/// Optional explicit selection
#[derive(Debug, Default, Deserialize)]
pub struct ResolveQuery {
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl ResolveQuery {
    /// Explicit config from the query, `None` when nothing was given
    pub fn explicit(&self) -> AppResult<Option<ModelConfig>> {
        match (&self.provider, &self.model) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(AppError::Validation(
                "'model' requires 'provider'".to_string(),
            )),
            (Some(provider), model) => {
                let provider: Provider = provider.parse()?;
                Ok(Some(ModelConfig::new(
                    provider,
                    model.as_deref().unwrap_or("").trim(),
                )))
            }
        }
    }
}

/// Resolved model, without the API key
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub task: Task,
    #[serde(flatten)]
    pub model: ModelConfig,
    pub has_api_key: bool,
}

/// GET /resolve/{task}
///
/// Without query parameters the configured per-task override (if any) is the
/// explicit selection.
pub async fn handler(
    State(state): State<AppState>,
    Path(task): Path<String>,
    Query(query): Query<ResolveQuery>,
) -> AppResult<Json<ResolveResponse>> {
    let task: Task = task.parse()?;
    let explicit = query.explicit()?;

    let result = match explicit {
        Some(explicit) => state.resolver().resolve(task, Some(&explicit)),
        None => state.resolver().resolve_configured(task),
    };

    match result {
        Ok(model) => {
            log_recording_failure(
                "record_resolution",
                state.metrics().record_resolution(task, model.provider),
            );
            let has_api_key = model.api_key.as_deref().is_some_and(|k| !k.is_empty());
            Ok(Json(ResolveResponse {
                task,
                model,
                has_api_key,
            }))
        }
        Err(e) => {
            if matches!(e, AppError::NoUsableProvider { .. }) {
                log_recording_failure(
                    "record_resolution_failure",
                    state.metrics().record_resolution_failure(task),
                );
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_without_parameters_has_no_explicit() {
        assert!(ResolveQuery::default().explicit().unwrap().is_none());
    }

    #[test]
    fn test_query_model_without_provider_is_rejected() {
        let query = ResolveQuery {
            provider: None,
            model: Some("o3".to_string()),
        };
        assert!(matches!(
            query.explicit(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_query_provider_only_is_partial() {
        let query = ResolveQuery {
            provider: Some("anthropic".to_string()),
            model: None,
        };
        let explicit = query.explicit().unwrap().unwrap();
        assert_eq!(explicit.provider, Provider::Anthropic);
        assert!(!explicit.is_fully_specified());
    }
}
