//! Test Helper Utilities
//!
//! Shared fakes and fixtures for grievance-intake integration tests

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{mess_analysis, CountingStore, FakeAnalyzer};

use grievance_common::db::init_memory_database;
use grievance_intake::db::SqliteGrievanceStore;

/// In-memory SQLite store with the full schema
pub async fn memory_store() -> SqliteGrievanceStore {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");
    SqliteGrievanceStore::new(pool)
}

/// Count rows in a table
pub async fn row_count(pool: &sqlx::SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Should count rows")
}
