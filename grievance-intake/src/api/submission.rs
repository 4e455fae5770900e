//! Grievance submission endpoint
//!
//! POST /grievances

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use grievance_common::UserInfo;
use serde::Deserialize;

use crate::services::{FailureKind, SubmissionError, SubmissionOutcome};
use crate::AppState;

/// POST /grievances request
#[derive(Debug, Deserialize)]
pub struct SubmitGrievanceRequest {
    /// Missing or null text is treated like empty text and rejected by
    /// validation
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

/// POST /grievances
///
/// Always answers with a `SubmissionOutcome` body; the status code mirrors
/// the outcome (201 stored, 400 validation, 503 store unreachable, 500
/// store failure). A body that is not a valid request (bad JSON, wrong
/// field types, wrong content type) is a validation failure.
pub async fn submit_grievance(
    State(state): State<AppState>,
    payload: Result<Json<SubmitGrievanceRequest>, JsonRejection>,
) -> (StatusCode, Json<SubmissionOutcome>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Rejected malformed submission"
            );
            let err = SubmissionError::Validation(rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(SubmissionOutcome::failed(&err)));
        }
    };

    let raw_text = request.raw_text.unwrap_or_default();
    let outcome = state
        .orchestrator
        .submit(&raw_text, request.user_info.as_ref())
        .await;

    let status = match outcome.error {
        None => StatusCode::CREATED,
        Some(FailureKind::ValidationError) => StatusCode::BAD_REQUEST,
        Some(FailureKind::StorageUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        Some(FailureKind::StorageError) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(outcome))
}

/// Build submission routes
pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/grievances", post(submit_grievance))
}
