// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::http_client::UpstreamError;

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation error
    #[error("{0}")]
    ValidationError(String),

    /// Error from the DramaBox API or the token sources
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        source: UpstreamError,
    },

    /// Unknown route
    #[error("Endpoint not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Wrap an upstream failure with a user-facing summary
    pub fn upstream(context: &'static str, source: UpstreamError) -> Self {
        ApiError::Upstream { context, source }
    }

    /// HTTP status returned to the client
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { source, .. } => match source {
                UpstreamError::Token(_) => StatusCode::SERVICE_UNAVAILABLE,
                e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::ValidationError(msg) => json!({
                "success": false,
                "error": msg,
            }),
            ApiError::Upstream { context, source } => {
                tracing::error!(
                    upstream_status = ?source.status(),
                    "{}: {}",
                    context,
                    source
                );
                json!({
                    "success": false,
                    "error": context,
                    "message": source.to_string(),
                })
            }
            ApiError::NotFound(path) => json!({
                "success": false,
                "error": "Endpoint not found",
                "path": path,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
