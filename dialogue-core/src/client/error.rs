//! Completion client error types

use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors returned by the model endpoint or the transport in front of it
///
/// Variants raised from an HTTP response carry the server's message,
/// suffixed with the request id.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Throttled; `retry_after` is the server's hint
    #[error("Rate limit exceeded{}: {message}",
            .retry_after.map(|d| format!(" (retry after {:?})", d)).unwrap_or_default())]
    RateLimit {
        retry_after: Option<Duration>,
        message: String,
    },

    #[error("Request timeout: {message}")]
    Timeout { message: String },

    /// Temporary server error (5xx)
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// Invalid request that should not be retried (4xx)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The endpoint rejected the bearer token (401/403)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// 404; `model` is set only when the message names one
    #[error("Model{} not available: {message}",
            .model.as_ref().map(|m| format!(" '{}'", m)).unwrap_or_default())]
    ModelNotAvailable {
        model: Option<String>,
        message: String,
    },

    /// Connection-level failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// Anything else
    #[error("Error [{code}]: {message}")]
    Custom { code: String, message: String },
}

impl ProviderError {
    /// Whether a transport-level retry may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } => true,
            Self::Timeout { .. } => true,
            Self::ServerError { .. } => true,
            Self::Network { .. } => true,
            Self::InvalidRequest { .. } => false,
            Self::Unauthorized { .. } => false,
            Self::ModelNotAvailable { .. } => false,
            Self::Custom { .. } => false,
        }
    }

    /// Delay requested by the server, if any
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            ProviderError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            ProviderError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// A successful call returned a payload without the expected answer
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unexpected response structure ({reason}). Full response:\n{payload}")]
pub struct ResponseShapeError {
    /// Which part of the payload was missing
    pub reason: String,

    /// The raw payload, pretty-printed when it was JSON
    pub payload: String,
}

impl ResponseShapeError {
    pub fn new(reason: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            payload: payload.into(),
        }
    }

    /// Build from a parsed payload, pretty-printing it for diagnosis
    pub fn from_value(reason: impl Into<String>, payload: &serde_json::Value) -> Self {
        let rendered =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self::new(reason, rendered)
    }
}
