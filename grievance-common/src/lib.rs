//! # Grievance Common Library
//!
//! Shared code for the grievance intake service:
//! - Error type used by storage and configuration code
//! - Configuration loading (TOML file, defaults)
//! - Grievance and analysis record models
//! - Database bootstrap (schema creation)

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{AnalysisData, AnalysisResult, Grievance, GrievanceRecord, UserInfo};
