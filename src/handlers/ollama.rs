//! Ollama pre-flight endpoints
//!
//! Both handlers probe the configured base URL only. Failures are reported
//! through the classifier's fixed advice, never the raw transport error.

use crate::classify::{ProviderFailure, classify};
use crate::handlers::AppState;
use crate::metrics::{ProbeOperation, ProbeOutcome, log_recording_failure};
use crate::probe::{ConnectionReport, ProbeError};
use axum::{Json, extract::State};
use serde::Serialize;

/// GET /providers/ollama/status
pub async fn status_handler(State(state): State<AppState>) -> Json<ConnectionReport> {
    let base_url = state.resolver().ollama_base_url().to_string();
    let report = state.probe().diagnose(&base_url).await;

    log_recording_failure(
        "record_probe",
        state.metrics().record_probe(
            ProbeOperation::Connection,
            ProbeOutcome::from(report.reachable),
        ),
    );
    if let Some(category) = report.category {
        log_recording_failure(
            "record_classified_error",
            state.metrics().record_classified_error(category),
        );
    }

    Json(report)
}

/// Response for GET /providers/ollama/models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub base_url: String,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<&'static str>,
}

/// GET /providers/ollama/models
///
/// Models are listed in server order. Any failure yields an empty list.
pub async fn models_handler(State(state): State<AppState>) -> Json<ModelsResponse> {
    let base_url = state.resolver().ollama_base_url().to_string();

    let (models, advice) = match state.probe().list_models(&base_url).await {
        Ok(models) => (models, None),
        Err(e) => {
            let (category, advice) = classify(&ProviderFailure::from(&e));
            if matches!(e, ProbeError::Status { .. }) {
                tracing::debug!(base_url = %base_url, error = %e, "Ollama model listing unavailable");
            } else {
                tracing::warn!(
                    base_url = %base_url,
                    category = %category,
                    error = %e,
                    "Failed to fetch Ollama models"
                );
            }
            log_recording_failure(
                "record_classified_error",
                state.metrics().record_classified_error(category),
            );
            (Vec::new(), Some(advice))
        }
    };

    log_recording_failure(
        "record_probe",
        state.metrics().record_probe(
            ProbeOperation::Discovery,
            ProbeOutcome::from(advice.is_none()),
        ),
    );

    tracing::debug!(
        base_url = %base_url,
        model_count = models.len(),
        "Listed Ollama models"
    );

    Json(ModelsResponse {
        base_url,
        models,
        advice,
    })
}
