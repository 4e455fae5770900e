//! Submission orchestrator tests
//!
//! Covers:
//! - Storage success independent of analysis availability
//! - Validation and unreachable-store failures perform zero writes
//! - CSV fallback only after the direct path fails
//! - Analysis persistence failure does not fail the submission
//! - No deduplication by content

mod helpers;

use grievance_common::{AnalysisData, UserInfo};
use grievance_intake::db::{analysis, grievances};
use grievance_intake::services::{FailureKind, SubmissionOrchestrator};
use helpers::{memory_store, mess_analysis, row_count, CountingStore, FakeAnalyzer};

const MESS_COMPLAINT: &str = "The mess food is awful and uncooked.";

fn csv_analysis() -> AnalysisData {
    AnalysisData {
        category: "Mess".to_string(),
        sentiment: "Negative".to_string(),
        urgency: "Medium".to_string(),
        clean_text: "the mess food is awful and uncooked.".to_string(),
        confidence: Some(serde_json::json!({"source": "batch"})),
    }
}

#[tokio::test]
async fn test_direct_analysis_stored_and_linked() {
    let store = CountingStore::new(memory_store().await);
    let direct = FakeAnalyzer::succeeding("direct", mess_analysis());
    let fallback = FakeAnalyzer::failing("csv");
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(outcome.success);
    assert!(outcome.error.is_none());
    let grievance_id = outcome.grievance_id.expect("grievance id on success");
    assert_eq!(outcome.analysis_data, Some(mess_analysis()));

    // Fallback never consulted when the direct path succeeds
    assert_eq!(direct.calls(), 1);
    assert_eq!(fallback.calls(), 0);

    let stored = analysis::analysis_for_grievance(store.pool(), grievance_id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].data(), mess_analysis());

    let record = grievances::find_grievance(store.pool(), grievance_id)
        .await
        .unwrap();
    assert_eq!(record.raw_text, MESS_COMPLAINT);
    assert_eq!(record.origin, "web-form");
}

#[tokio::test]
async fn test_csv_fallback_result_returned_exactly() {
    let store = CountingStore::new(memory_store().await);
    let direct = FakeAnalyzer::failing("direct");
    let fallback = FakeAnalyzer::succeeding("csv", csv_analysis());
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.analysis_data, Some(csv_analysis()));
    assert_eq!(direct.calls(), 1);
    assert_eq!(fallback.calls(), 1);
    assert_eq!(row_count(store.pool(), "analysis_results").await, 1);
}

#[tokio::test]
async fn test_both_paths_fail_still_stores_grievance() {
    let store = CountingStore::new(memory_store().await);
    let direct = FakeAnalyzer::failing("direct");
    let fallback = FakeAnalyzer::failing("csv");
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit("Water leak near Block C.", None).await;

    assert!(outcome.success);
    assert!(outcome.grievance_id.is_some());
    assert!(outcome.analysis_data.is_none());
    assert!(!outcome.is_categorized());

    assert_eq!(row_count(store.pool(), "user_grievances").await, 1);
    assert_eq!(row_count(store.pool(), "analysis_results").await, 0);
    assert_eq!(store.analysis_writes(), 0);
}

#[tokio::test]
async fn test_whitespace_text_rejected_without_writes() {
    for text in ["", "   ", "\n\t  \r\n"] {
        let store = CountingStore::new(memory_store().await);
        let direct = FakeAnalyzer::succeeding("direct", mess_analysis());
        let fallback = FakeAnalyzer::succeeding("csv", csv_analysis());
        let orchestrator =
            SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

        let outcome = orchestrator.submit(text, None).await;

        assert!(!outcome.success, "text {:?} should be rejected", text);
        assert_eq!(outcome.error, Some(FailureKind::ValidationError));
        assert!(outcome.grievance_id.is_none());
        assert_eq!(store.grievance_writes(), 0);
        assert_eq!(direct.calls(), 0);
        assert_eq!(row_count(store.pool(), "user_grievances").await, 0);
    }
}

#[tokio::test]
async fn test_unreachable_store_fails_without_writes() {
    let store = CountingStore::unreachable(memory_store().await);
    let direct = FakeAnalyzer::succeeding("direct", mess_analysis());
    let fallback = FakeAnalyzer::succeeding("csv", csv_analysis());
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(FailureKind::StorageUnavailable));
    assert!(outcome.details.is_some());
    assert!(outcome.analysis_data.is_none());

    // No analysis attempted, nothing persisted
    assert_eq!(store.grievance_writes(), 0);
    assert_eq!(store.analysis_writes(), 0);
    assert_eq!(direct.calls(), 0);
    assert_eq!(fallback.calls(), 0);
    assert_eq!(row_count(store.pool(), "user_grievances").await, 0);
}

#[tokio::test]
async fn test_grievance_insert_failure_is_fatal() {
    let store = CountingStore::failing_grievance_insert(memory_store().await);
    let direct = FakeAnalyzer::succeeding("direct", mess_analysis());
    let fallback = FakeAnalyzer::succeeding("csv", csv_analysis());
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(FailureKind::StorageError));
    assert!(outcome.grievance_id.is_none());
    assert!(outcome.analysis_data.is_none());
    assert!(outcome.details.as_deref().is_some_and(|d| d.contains("database is locked")));

    // Insert attempted once, then nothing else
    assert_eq!(store.grievance_writes(), 1);
    assert_eq!(store.analysis_writes(), 0);
    assert_eq!(direct.calls(), 0);
    assert_eq!(fallback.calls(), 0);
    assert_eq!(row_count(store.pool(), "user_grievances").await, 0);
}

#[tokio::test]
async fn test_closed_database_reports_storage_unavailable() {
    let store = memory_store().await;
    store.pool().close().await;
    let orchestrator = SubmissionOrchestrator::new(
        std::sync::Arc::new(store),
        FakeAnalyzer::succeeding("direct", mess_analysis()),
        FakeAnalyzer::failing("csv"),
        "web-form",
    );

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(FailureKind::StorageUnavailable));
}

#[tokio::test]
async fn test_analysis_insert_failure_keeps_success() {
    let store = CountingStore::failing_analysis_insert(memory_store().await);
    let direct = FakeAnalyzer::succeeding("direct", mess_analysis());
    let fallback = FakeAnalyzer::failing("csv");
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "web-form");

    let outcome = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(outcome.success);
    assert!(outcome.grievance_id.is_some());
    assert_eq!(outcome.analysis_data, Some(mess_analysis()));
    assert!(outcome.error.is_none());
    assert_eq!(store.analysis_writes(), 1);
    assert_eq!(row_count(store.pool(), "analysis_results").await, 0);

    let last_error = orchestrator.last_internal_error().await;
    assert!(
        last_error.as_deref().is_some_and(|e| e.contains("disk I/O error")),
        "internal failure should be recorded, got {:?}",
        last_error
    );
}

#[tokio::test]
async fn test_identical_text_creates_distinct_grievances() {
    let store = CountingStore::new(memory_store().await);
    let orchestrator = SubmissionOrchestrator::new(
        store.clone(),
        FakeAnalyzer::failing("direct"),
        FakeAnalyzer::failing("csv"),
        "web-form",
    );

    let first = orchestrator.submit(MESS_COMPLAINT, None).await;
    let second = orchestrator.submit(MESS_COMPLAINT, None).await;

    assert!(first.success && second.success);
    assert_ne!(first.grievance_id, second.grievance_id);
    assert_eq!(row_count(store.pool(), "user_grievances").await, 2);
}

#[tokio::test]
async fn test_trimmed_text_sent_to_analysis_and_stored() {
    let store = CountingStore::new(memory_store().await);
    let direct = FakeAnalyzer::failing("direct");
    let fallback = FakeAnalyzer::succeeding("csv", csv_analysis());
    let orchestrator =
        SubmissionOrchestrator::new(store.clone(), direct.clone(), fallback.clone(), "kiosk");
    let user_info = UserInfo {
        name: Some("Meera".to_string()),
        room_number: Some("A-101".to_string()),
        email: None,
    };

    let outcome = orchestrator
        .submit("   Fan not working in A-101.  \n", Some(&user_info))
        .await;

    assert!(outcome.success);
    assert_eq!(direct.texts(), vec!["Fan not working in A-101.".to_string()]);
    assert_eq!(fallback.texts(), vec!["Fan not working in A-101.".to_string()]);

    let record = grievances::find_grievance(store.pool(), outcome.grievance_id.unwrap())
        .await
        .unwrap();
    assert_eq!(record.raw_text, "Fan not working in A-101.");
    assert_eq!(record.origin, "kiosk");
    assert_eq!(record.user_info, Some(user_info));
}
