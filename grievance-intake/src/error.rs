//! Error types for the HTTP layer
//!
//! Submissions report failures inside their outcome body; these errors are
//! for the read-side and status endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// grievance-common error
    #[error(transparent)]
    Common(#[from] grievance_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Common(err) = self;
        let (status, error_code, message) = match err {
            grievance_common::Error::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            grievance_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    other.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
