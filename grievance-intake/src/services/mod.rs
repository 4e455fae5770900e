//! Service components for grievance submission
//!
//! - [`AnalysisClient`]: direct single-text classification
//! - [`CsvAnalysisAdapter`]: fallback through the batch CSV endpoint
//! - [`SubmissionOrchestrator`]: store, then analyze with one fallback

pub mod analysis_client;
pub mod csv_adapter;
pub mod orchestrator;

pub use analysis_client::{AnalysisClient, ServiceStatus};
pub use csv_adapter::{single_row_csv, CsvAnalysisAdapter};
pub use orchestrator::{
    FailureKind, SubmissionError, SubmissionOrchestrator, SubmissionOutcome, SubmissionStage,
};

use async_trait::async_trait;
use grievance_common::AnalysisData;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("grievance-intake/", env!("CARGO_PKG_VERSION"));

/// Analysis failure
///
/// Every variant means "analysis unavailable" to the orchestrator and
/// triggers the fallback path. [`AnalysisError::is_retryable`] is
/// informational only.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Decode(String),

    #[error("Batch response contained no records")]
    EmptyBatch,
}

impl AnalysisError {
    /// Whether repeating the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Network(_) | AnalysisError::Timeout(_) => true,
            AnalysisError::Status { status, .. } => *status >= 500 || *status == 429,
            AnalysisError::Decode(_) | AnalysisError::EmptyBatch => false,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout(timeout)
        } else if err.is_decode() {
            AnalysisError::Decode(err.to_string())
        } else {
            AnalysisError::Network(err.to_string())
        }
    }

    /// Map a non-2xx response, consuming its body for diagnostics
    pub(crate) async fn from_status(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AnalysisError::Status { status, body }
    }
}

/// One way of classifying a complaint text
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short identifier used in logs ("direct", "csv")
    fn source_id(&self) -> &'static str;

    async fn analyze(&self, text: &str) -> Result<AnalysisData, AnalysisError>;
}

/// HTTP client shared by the analysis paths
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AnalysisError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| AnalysisError::Network(e.to_string()))
}
