//! Storage traits and error types
//!
//! This module defines the trait interface for report cache backends and
//! associated error types.

use crate::model::FinalReport;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp in cache: {0}")]
    Timestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A cache of completed scan reports
///
/// Reports are keyed by the canonical start URL plus a fingerprint of the
/// scan limits. Callers treat every error as a cache miss.
pub trait ReportStore: Send + Sync {
    /// Returns the newest report for the key if it is still fresh
    ///
    /// # Arguments
    ///
    /// * `url` - The scan's start URL (canonicalized by the store)
    /// * `fingerprint` - Fingerprint of the scan limits
    fn get_report(&self, url: &str, fingerprint: &str) -> StorageResult<Option<FinalReport>>;

    /// Stores a completed report under the key
    fn save_report(&self, url: &str, fingerprint: &str, report: &FinalReport) -> StorageResult<()>;
}
