//! Provider error classification
//!
//! Single translation point between raw provider failures and user-facing
//! text. The output is a category plus a fixed advisory message; the raw
//! error text never reaches the caller.

use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

/// User-facing failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ConnectionRefused,
    ModelNotFound,
    InsufficientMemory,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 5] = [
        ErrorCategory::ConnectionRefused,
        ErrorCategory::ModelNotFound,
        ErrorCategory::InsufficientMemory,
        ErrorCategory::Timeout,
        ErrorCategory::Unknown,
    ];

    /// Label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => "connection_refused",
            Self::ModelNotFound => "model_not_found",
            Self::InsufficientMemory => "insufficient_memory",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Fixed advisory shown to end users
    pub fn message(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => {
                "Ollama service is not running. Please start Ollama and try again."
            }
            Self::ModelNotFound => {
                "The requested model is not available. Please pull the model first using: ollama pull <model-name>"
            }
            Self::InsufficientMemory => {
                "Insufficient memory to load the model. Consider using a smaller model or freeing up system memory."
            }
            Self::Timeout => {
                "Ollama request timed out. The model may be loading or the request is taking longer than expected."
            }
            Self::Unknown => "An unknown error occurred while communicating with Ollama.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failure as received from a provider, resolved once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// Plain error text
    Message(String),
    /// Structured error that may or may not carry a message
    Error { message: Option<String> },
}

impl ProviderFailure {
    /// Textual message, empty when none is extractable
    pub fn message(&self) -> &str {
        match self {
            Self::Message(msg) => msg,
            Self::Error { message } => message.as_deref().unwrap_or(""),
        }
    }

    /// Build from any error, flattening its source chain into one message
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::Error {
            message: Some(error_chain(err)),
        }
    }
}

impl From<&str> for ProviderFailure {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

impl From<String> for ProviderFailure {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// Keeps the error kind and source chain but not reqwest's own `Display`,
/// which embeds the URL (a port like 54041 would otherwise read as "404").
impl From<&reqwest::Error> for ProviderFailure {
    fn from(err: &reqwest::Error) -> Self {
        let mut parts = Vec::new();
        if err.is_timeout() {
            parts.push("timeout".to_string());
        }
        if let Some(status) = err.status() {
            parts.push(format!("status {}", status.as_u16()));
        }
        if let Some(source) = err.source() {
            parts.push(error_chain(source));
        }
        if parts.is_empty() {
            parts.push("request failed".to_string());
        }
        Self::Error {
            message: Some(parts.join(": ")),
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

const CONNECTION_REFUSED_PATTERNS: &[&str] =
    &["ECONNREFUSED", "connection refused", "Connection refused"];
const MODEL_NOT_FOUND_PATTERNS: &[&str] = &["model not found", "404"];
const OUT_OF_MEMORY_PATTERNS: &[&str] = &["out of memory", "OOM"];
const TIMEOUT_PATTERNS: &[&str] = &["timeout", "ETIMEDOUT", "timed out"];

/// Classify a raw provider failure
///
/// Substring checks run in fixed priority order and the first match wins:
/// connection refused, model not found, out of memory, timeout, unknown.
pub fn classify(failure: &ProviderFailure) -> (ErrorCategory, &'static str) {
    let category = categorize(failure.message());
    (category, category.message())
}

/// Category for a raw message, see [`classify`]
pub fn categorize(message: &str) -> ErrorCategory {
    let matches = |patterns: &[&str]| patterns.iter().any(|p| message.contains(p));

    if matches(CONNECTION_REFUSED_PATTERNS) {
        ErrorCategory::ConnectionRefused
    } else if matches(MODEL_NOT_FOUND_PATTERNS) {
        ErrorCategory::ModelNotFound
    } else if matches(OUT_OF_MEMORY_PATTERNS) {
        ErrorCategory::InsufficientMemory
    } else if matches(TIMEOUT_PATTERNS) {
        ErrorCategory::Timeout
    } else {
        ErrorCategory::Unknown
    }
}
