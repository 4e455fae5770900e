//! Persistence gateway
//!
//! [`GrievanceStore`] is the contract the submission orchestrator writes
//! through. [`SqliteGrievanceStore`] implements it over the shared pool; the
//! free functions in the submodules are also used directly by read-only
//! API handlers.

pub mod analysis;
pub mod grievances;

use async_trait::async_trait;
use grievance_common::{AnalysisData, AnalysisResult, Grievance, Result, UserInfo};
use sqlx::SqlitePool;
use std::time::Duration;

/// Upper bound for the connectivity probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Write-side storage contract for submissions
#[async_trait]
pub trait GrievanceStore: Send + Sync {
    /// Side-effect-free reachability check; never fails, returns false instead
    async fn probe_connectivity(&self) -> bool;

    /// Store a grievance; `Validation` error if text is empty after trimming
    async fn insert_grievance(
        &self,
        raw_text: &str,
        user_info: Option<&UserInfo>,
        origin: &str,
    ) -> Result<Grievance>;

    /// Store the analysis of an existing grievance; `Storage` error if the
    /// grievance id does not exist
    async fn insert_analysis_result(
        &self,
        grievance_id: i64,
        data: &AnalysisData,
    ) -> Result<AnalysisResult>;
}

/// SQLite-backed [`GrievanceStore`]
#[derive(Clone)]
pub struct SqliteGrievanceStore {
    pool: SqlitePool,
}

impl SqliteGrievanceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl GrievanceStore for SqliteGrievanceStore {
    async fn probe_connectivity(&self) -> bool {
        if self.pool.is_closed() {
            return false;
        }

        let probe = sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool);
        match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Database connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(timeout = ?PROBE_TIMEOUT, "Database connectivity probe timed out");
                false
            }
        }
    }

    async fn insert_grievance(
        &self,
        raw_text: &str,
        user_info: Option<&UserInfo>,
        origin: &str,
    ) -> Result<Grievance> {
        grievances::insert_grievance(&self.pool, raw_text, user_info, origin).await
    }

    async fn insert_analysis_result(
        &self,
        grievance_id: i64,
        data: &AnalysisData,
    ) -> Result<AnalysisResult> {
        analysis::insert_analysis_result(&self.pool, grievance_id, data).await
    }
}
