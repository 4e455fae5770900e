//! Health and dependency status endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::services::ServiceStatus;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the database probe fails
    pub status: String,
    /// Module name ("grievance-intake")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Result of the store connectivity probe
    pub database_reachable: bool,
    /// Last internal error (logged, not reported to submitters)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let database_reachable = state.orchestrator.store().probe_connectivity().await;
    let last_error = state.orchestrator.last_internal_error().await;

    Json(HealthResponse {
        status: if database_reachable { "ok" } else { "degraded" }.to_string(),
        module: "grievance-intake".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        database_reachable,
        last_error,
    })
}

/// GET /analysis/status
///
/// Health of the external analysis service; independent of submissions.
pub async fn analysis_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.analysis_client.check_status().await)
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/analysis/status", get(analysis_status))
}
