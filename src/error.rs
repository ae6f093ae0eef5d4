//! Error types for the AI gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == AI Error Enum ==
/// Unified error type for the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// Upstream signalled request throttling (HTTP 429). Never retried.
    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    /// Any other failure of the upstream call. Retried with backoff.
    #[error("Upstream call failed: {0}")]
    Upstream(String),

    /// The upstream answered but the payload could not be decoded.
    #[error("Invalid response shape: {0}")]
    InvalidResponse(String),

    /// The request queue consumer is gone
    #[error("Request queue is closed")]
    QueueClosed,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AiError {
    /// True for the fail-fast class of errors.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::RateLimited(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let status = match &self {
            AiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AiError::Upstream(_) | AiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AiError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            AiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, AiError>;
