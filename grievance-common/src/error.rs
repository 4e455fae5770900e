//! Common error types for the grievance service

use thiserror::Error;

/// Common result type for grievance operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the grievance crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected input (e.g. grievance text empty after trimming)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage-level failure that is not a raw driver error
    /// (e.g. referential integrity violated by the caller)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the store
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
