//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Document or node not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request or payload (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// I/O failure or corrupt durable state (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<inkgraph_storage::StorageError> for ApiError {
    fn from(err: inkgraph_storage::StorageError) -> Self {
        use inkgraph_storage::StorageError;

        match &err {
            StorageError::DocumentNotFound { .. } | StorageError::NodeNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            StorageError::MalformedPayload(_) | StorageError::MalformedRequest(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StorageError::Io { .. }
            | StorageError::CorruptDocument { .. }
            | StorageError::Serialization(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkgraph_core::NodeId;
    use inkgraph_storage::StorageError;

    #[test]
    fn test_storage_error_status_mapping() {
        let cases = [
            (StorageError::NodeNotFound { id: NodeId(4) }, StatusCode::NOT_FOUND),
            (
                StorageError::DocumentNotFound { location: "data.json".into() },
                StatusCode::NOT_FOUND,
            ),
            (StorageError::MalformedPayload("x".into()), StatusCode::BAD_REQUEST),
            (StorageError::MalformedRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                StorageError::CorruptDocument {
                    location: "data.json".into(),
                    reason: "eof".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StorageError::io("images", std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
