//! Submission orchestrator
//!
//! Stage order for one submission:
//!
//! ```text
//! Init -> Stored -> AnalyzingDirect -> [AnalyzingCsv] -> Finalized
//! ```
//!
//! Success means the grievance is durably stored. Analysis is best-effort:
//! the direct path is tried once, the CSV path once if the direct path fails,
//! and a failure of both still yields a successful (uncategorized) outcome.
//! The grievance row is always written before its analysis row.

use grievance_common::{AnalysisData, Grievance, UserInfo};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::Instrument;
use uuid::Uuid;

use super::Analyzer;
use crate::db::GrievanceStore;

/// Stages of a single submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Init,
    Stored,
    AnalyzingDirect,
    AnalyzingCsv,
    Finalized,
}

/// Wire error codes returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    ValidationError,
    StorageUnavailable,
    StorageError,
}

/// Terminal failures of a submission; nothing is retried
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Grievance store is unreachable")]
    StorageUnavailable,

    #[error("Failed to store grievance: {0}")]
    Storage(String),
}

impl SubmissionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SubmissionError::Validation(_) => FailureKind::ValidationError,
            SubmissionError::StorageUnavailable => FailureKind::StorageUnavailable,
            SubmissionError::Storage(_) => FailureKind::StorageError,
        }
    }

    fn user_message(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => {
                "Please describe your grievance before submitting."
            }
            SubmissionError::StorageUnavailable => {
                "The grievance system is temporarily unavailable. Your grievance was not recorded; please try again later."
            }
            SubmissionError::Storage(_) => {
                "Your grievance could not be recorded. Please try again later."
            }
        }
    }
}

impl From<grievance_common::Error> for SubmissionError {
    fn from(err: grievance_common::Error) -> Self {
        match err {
            grievance_common::Error::Validation(msg) => SubmissionError::Validation(msg),
            other => SubmissionError::Storage(other.to_string()),
        }
    }
}

/// Result of one submission as returned to the caller
///
/// `grievance_id` is present iff `success`; `analysis_data` iff an analysis
/// path succeeded; `error`/`details` iff not `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grievance_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_data: Option<AnalysisData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// User-facing status text
    pub message: String,
}

impl SubmissionOutcome {
    fn stored(grievance_id: i64, analysis_data: Option<AnalysisData>) -> Self {
        let message = if analysis_data.is_some() {
            "Your grievance has been recorded and categorized."
        } else {
            "Your grievance has been recorded. Categorization is not available right now."
        };

        Self {
            success: true,
            grievance_id: Some(grievance_id),
            analysis_data,
            error: None,
            details: None,
            message: message.to_string(),
        }
    }

    /// Outcome for a submission rejected before or at storage
    pub fn failed(err: &SubmissionError) -> Self {
        Self {
            success: false,
            grievance_id: None,
            analysis_data: None,
            error: Some(err.kind()),
            details: Some(err.to_string()),
            message: err.user_message().to_string(),
        }
    }

    /// Stored and categorized, as opposed to stored only
    pub fn is_categorized(&self) -> bool {
        self.success && self.analysis_data.is_some()
    }
}

/// Coordinates storage and the two analysis paths for each submission
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    store: Arc<dyn GrievanceStore>,
    direct: Arc<dyn Analyzer>,
    fallback: Arc<dyn Analyzer>,
    origin_tag: String,
    /// Last internal failure that was logged but not reported to the user
    last_internal_error: Arc<RwLock<Option<String>>>,
}

impl SubmissionOrchestrator {
    pub fn new(
        store: Arc<dyn GrievanceStore>,
        direct: Arc<dyn Analyzer>,
        fallback: Arc<dyn Analyzer>,
        origin_tag: impl Into<String>,
    ) -> Self {
        Self {
            store,
            direct,
            fallback,
            origin_tag: origin_tag.into(),
            last_internal_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn store(&self) -> &Arc<dyn GrievanceStore> {
        &self.store
    }

    pub async fn last_internal_error(&self) -> Option<String> {
        self.last_internal_error.read().await.clone()
    }

    /// Submit one grievance
    ///
    /// Never returns an error: failures are carried in the outcome.
    pub async fn submit(&self, text: &str, user_info: Option<&UserInfo>) -> SubmissionOutcome {
        let span = tracing::info_span!("submission", submission_id = %Uuid::new_v4());

        async {
            let outcome = match self.run(text, user_info).await {
                Ok((grievance, analysis)) => SubmissionOutcome::stored(grievance.id, analysis),
                Err(err) => {
                    tracing::warn!(error = %err, kind = ?err.kind(), "Submission failed");
                    SubmissionOutcome::failed(&err)
                }
            };

            enter(SubmissionStage::Finalized);
            if outcome.success {
                tracing::info!(
                    grievance_id = ?outcome.grievance_id,
                    categorized = outcome.is_categorized(),
                    "Submission completed"
                );
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        text: &str,
        user_info: Option<&UserInfo>,
    ) -> Result<(Grievance, Option<AnalysisData>), SubmissionError> {
        enter(SubmissionStage::Init);
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmissionError::Validation(
                "grievance text is required".to_string(),
            ));
        }

        // Best-effort gate; the store can still fail right after a true probe
        if !self.store.probe_connectivity().await {
            return Err(SubmissionError::StorageUnavailable);
        }

        let grievance = self
            .store
            .insert_grievance(text, user_info, &self.origin_tag)
            .await?;
        enter(SubmissionStage::Stored);
        tracing::info!(grievance_id = grievance.id, "Grievance stored");

        let analysis = self.analyze(&grievance.raw_text).await;

        if let Some(data) = &analysis {
            if let Err(e) = self.store.insert_analysis_result(grievance.id, data).await {
                // Grievance is already stored; this does not fail the submission
                tracing::error!(
                    grievance_id = grievance.id,
                    error = %e,
                    "Failed to store analysis result"
                );
                *self.last_internal_error.write().await = Some(format!(
                    "analysis for grievance {} not stored: {}",
                    grievance.id, e
                ));
            }
        }

        Ok((grievance, analysis))
    }

    /// Direct path first, CSV path once if it fails
    async fn analyze(&self, text: &str) -> Option<AnalysisData> {
        enter(SubmissionStage::AnalyzingDirect);
        let direct_err = match self.direct.analyze(text).await {
            Ok(data) => return Some(data),
            Err(e) => e,
        };
        tracing::warn!(
            source = self.direct.source_id(),
            error = %direct_err,
            retryable = direct_err.is_retryable(),
            "Direct analysis unavailable, falling back"
        );

        enter(SubmissionStage::AnalyzingCsv);
        match self.fallback.analyze(text).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(
                    source = self.fallback.source_id(),
                    error = %e,
                    "Fallback analysis unavailable, storing without analysis"
                );
                None
            }
        }
    }
}

fn enter(stage: SubmissionStage) {
    tracing::debug!(stage = ?stage, "Submission stage");
}
