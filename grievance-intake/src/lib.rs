//! grievance-intake library interface
//!
//! Exposes the router, state and service components for the binary and for
//! integration tests.

pub mod api;
pub mod cli;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use grievance_common::config::ServiceSettings;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::SqliteGrievanceStore;
use crate::services::{AnalysisClient, AnalysisError, CsvAnalysisAdapter, SubmissionOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-side queries)
    pub db: SqlitePool,
    /// Submission pipeline
    pub orchestrator: SubmissionOrchestrator,
    /// Direct analysis client, also used for the status probe
    pub analysis_client: AnalysisClient,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        orchestrator: SubmissionOrchestrator,
        analysis_client: AnalysisClient,
    ) -> Self {
        Self {
            db,
            orchestrator,
            analysis_client,
            startup_time: Utc::now(),
        }
    }

    /// Wire the SQLite store and both analysis paths from resolved settings
    pub fn from_settings(db: SqlitePool, settings: &ServiceSettings) -> Result<Self, AnalysisError> {
        let analysis_client =
            AnalysisClient::new(settings.analysis_base_url.clone(), settings.analysis_timeout)?;
        let csv_adapter =
            CsvAnalysisAdapter::new(settings.analysis_base_url.clone(), settings.analysis_timeout)?;

        let orchestrator = SubmissionOrchestrator::new(
            Arc::new(SqliteGrievanceStore::new(db.clone())),
            Arc::new(analysis_client.clone()),
            Arc::new(csv_adapter),
            settings.origin_tag.clone(),
        );

        Ok(Self::new(db, orchestrator, analysis_client))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::submission_routes())
        .merge(api::grievance_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
