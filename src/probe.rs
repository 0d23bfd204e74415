//! Connectivity and model discovery probes for self-hosted providers
//!
//! Both operations are advisory: failures are logged as warnings with the
//! offending base URL and degrade to `false` / an empty list. Neither returns
//! an error to the caller.

use crate::classify::{ErrorCategory, ProviderFailure, classify};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Listing endpoint used for both connectivity and discovery
pub const TAGS_PATH: &str = "/api/tags";

/// Classifier input for a listing body that failed to decode
const INVALID_BODY_MESSAGE: &str = "invalid response body";

/// Failure of a single probe request, kept inside this module
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode model list from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<&ProbeError> for ProviderFailure {
    fn from(err: &ProbeError) -> Self {
        match err {
            ProbeError::Transport { source, .. } => ProviderFailure::from(source),
            // serde positions ("column 404") must not reach the classifier
            ProbeError::Decode { .. } => ProviderFailure::Error {
                message: Some(INVALID_BODY_MESSAGE.to_string()),
            },
            ProbeError::Status { status, .. } => ProviderFailure::Error {
                message: Some(format!("status {}", status.as_u16())),
            },
        }
    }
}

/// Body of `GET /api/tags`; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Option<Vec<ModelDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct ModelDescriptor {
    name: String,
}

/// Outcome of a connectivity check, safe to show to end users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub base_url: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<&'static str>,
}

/// Probe seam for self-hosted model servers
#[async_trait]
pub trait ModelServerProbe: Send + Sync {
    /// True iff the listing endpoint answers with a success status
    async fn test_connection(&self, base_url: &str) -> bool;

    /// Model names in server order, empty on any failure
    async fn available_models(&self, base_url: &str) -> Vec<String>;
}

/// Build the listing URL without doubling slashes
pub fn tags_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TAGS_PATH)
}

/// reqwest-backed probe for Ollama's HTTP API
#[derive(Debug, Clone)]
pub struct OllamaProbe {
    client: reqwest::Client,
}

impl OllamaProbe {
    /// Probe relying on the transport's own timeout behaviour
    pub fn new() -> AppResult<Self> {
        Self::build(None)
    }

    /// Probe that gives up after `timeout`
    pub fn with_timeout(timeout: Duration) -> AppResult<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_tags(&self, base_url: &str) -> Result<reqwest::Response, ProbeError> {
        let url = tags_url(base_url);
        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ProbeError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status { url, status });
        }
        Ok(response)
    }

    /// Connectivity check that keeps the failure for classification
    pub async fn check(&self, base_url: &str) -> Result<(), ProbeError> {
        self.fetch_tags(base_url).await.map(|_| ())
    }

    /// Model listing that keeps the failure for classification
    ///
    /// A non-success status is reported as [`ProbeError::Status`]; a body
    /// without `models` yields an empty list.
    pub async fn list_models(&self, base_url: &str) -> Result<Vec<String>, ProbeError> {
        let response = self.fetch_tags(base_url).await?;
        let tags: TagsResponse = response.json().await.map_err(|source| ProbeError::Decode {
            url: tags_url(base_url),
            source,
        })?;
        Ok(tags
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    /// Connectivity check with a classified, user-safe outcome
    pub async fn diagnose(&self, base_url: &str) -> ConnectionReport {
        match self.check(base_url).await {
            Ok(()) => ConnectionReport {
                base_url: base_url.to_string(),
                reachable: true,
                category: None,
                advice: None,
            },
            Err(e) => {
                let (category, advice) = classify(&ProviderFailure::from(&e));
                tracing::warn!(
                    base_url = %base_url,
                    category = %category,
                    error = %e,
                    "Failed to connect to Ollama"
                );
                ConnectionReport {
                    base_url: base_url.to_string(),
                    reachable: false,
                    category: Some(category),
                    advice: Some(advice),
                }
            }
        }
    }
}

#[async_trait]
impl ModelServerProbe for OllamaProbe {
    async fn test_connection(&self, base_url: &str) -> bool {
        match self.check(base_url).await {
            Ok(()) => {
                tracing::debug!(base_url = %base_url, "Ollama connection check succeeded");
                true
            }
            Err(e) => {
                tracing::warn!(
                    base_url = %base_url,
                    error = %e,
                    "Failed to connect to Ollama"
                );
                false
            }
        }
    }

    async fn available_models(&self, base_url: &str) -> Vec<String> {
        match self.list_models(base_url).await {
            Ok(models) => {
                tracing::debug!(
                    base_url = %base_url,
                    model_count = models.len(),
                    "Fetched Ollama models"
                );
                models
            }
            Err(ProbeError::Status { status, .. }) => {
                tracing::debug!(
                    base_url = %base_url,
                    status = %status,
                    "Ollama model listing returned non-success status"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    base_url = %base_url,
                    error = %e,
                    "Failed to fetch Ollama models"
                );
                Vec::new()
            }
        }
    }
}

/// One-shot connectivity check with a default client
pub async fn test_connection(base_url: &str) -> bool {
    match OllamaProbe::new() {
        Ok(probe) => probe.test_connection(base_url).await,
        Err(e) => {
            tracing::warn!(base_url = %base_url, error = %e, "Failed to connect to Ollama");
            false
        }
    }
}

/// One-shot model discovery with a default client
pub async fn get_available_models(base_url: &str) -> Vec<String> {
    match OllamaProbe::new() {
        Ok(probe) => probe.available_models(base_url).await,
        Err(e) => {
            tracing::warn!(
                base_url = %base_url,
                error = %e,
                "Failed to fetch Ollama models"
            );
            Vec::new()
        }
    }
}
