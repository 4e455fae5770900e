//! In-process fakes for the analysis paths and the store

use async_trait::async_trait;
use grievance_common::{AnalysisData, AnalysisResult, Error, Grievance, Result, UserInfo};
use grievance_intake::db::{GrievanceStore, SqliteGrievanceStore};
use grievance_intake::services::{AnalysisError, Analyzer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Classification used by the mess-food scenario
pub fn mess_analysis() -> AnalysisData {
    AnalysisData {
        category: "Mess".to_string(),
        sentiment: "Negative".to_string(),
        urgency: "High".to_string(),
        clean_text: "the mess food is awful and uncooked".to_string(),
        confidence: None,
    }
}

/// Analyzer returning a fixed result and recording the texts it was given
pub struct FakeAnalyzer {
    source: &'static str,
    response: Option<AnalysisData>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn succeeding(source: &'static str, data: AnalysisData) -> Arc<Self> {
        Arc::new(Self {
            source,
            response: Some(data),
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(source: &'static str) -> Arc<Self> {
        Arc::new(Self {
            source,
            response: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    fn source_id(&self) -> &'static str {
        self.source
    }

    async fn analyze(&self, text: &str) -> std::result::Result<AnalysisData, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        self.response.clone().ok_or(AnalysisError::Status {
            status: 503,
            body: "model not loaded".to_string(),
        })
    }
}

/// Store wrapper that counts write attempts and can simulate failures
pub struct CountingStore {
    inner: SqliteGrievanceStore,
    reachable: bool,
    fail_grievance_insert: bool,
    fail_analysis_insert: bool,
    grievance_writes: AtomicUsize,
    analysis_writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: SqliteGrievanceStore) -> Arc<Self> {
        Self::build(inner, true, false, false)
    }

    pub fn unreachable(inner: SqliteGrievanceStore) -> Arc<Self> {
        Self::build(inner, false, false, false)
    }

    /// Probe succeeds but the grievance insert fails
    pub fn failing_grievance_insert(inner: SqliteGrievanceStore) -> Arc<Self> {
        Self::build(inner, true, true, false)
    }

    pub fn failing_analysis_insert(inner: SqliteGrievanceStore) -> Arc<Self> {
        Self::build(inner, true, false, true)
    }

    fn build(
        inner: SqliteGrievanceStore,
        reachable: bool,
        fail_grievance_insert: bool,
        fail_analysis_insert: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reachable,
            fail_grievance_insert,
            fail_analysis_insert,
            grievance_writes: AtomicUsize::new(0),
            analysis_writes: AtomicUsize::new(0),
        })
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.inner.pool()
    }

    pub fn grievance_writes(&self) -> usize {
        self.grievance_writes.load(Ordering::SeqCst)
    }

    pub fn analysis_writes(&self) -> usize {
        self.analysis_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GrievanceStore for CountingStore {
    async fn probe_connectivity(&self) -> bool {
        self.reachable && self.inner.probe_connectivity().await
    }

    async fn insert_grievance(
        &self,
        raw_text: &str,
        user_info: Option<&UserInfo>,
        origin: &str,
    ) -> Result<Grievance> {
        self.grievance_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_grievance_insert {
            return Err(Error::Storage("database is locked".to_string()));
        }
        self.inner.insert_grievance(raw_text, user_info, origin).await
    }

    async fn insert_analysis_result(
        &self,
        grievance_id: i64,
        data: &AnalysisData,
    ) -> Result<AnalysisResult> {
        self.analysis_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_analysis_insert {
            return Err(Error::Storage("disk I/O error".to_string()));
        }
        self.inner.insert_analysis_result(grievance_id, data).await
    }
}
