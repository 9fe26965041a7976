//! Storage module for the report cache
//!
//! This module persists completed scan reports so that repeated scans of
//! the same site with the same limits can be served without crawling:
//! - SQLite database initialization and schema management
//! - Report lookup with a staleness window
//! - Report persistence

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteReportStore;
pub use traits::{ReportStore, StorageError, StorageResult};

use crate::config::CacheConfig;
use std::sync::Arc;

/// Opens the configured report cache
///
/// Returns `None` when caching is disabled or the database cannot be opened;
/// in the latter case a warning is logged and scans run uncached.
pub fn open_report_store(config: &CacheConfig) -> Option<Arc<dyn ReportStore>> {
    if !config.enabled {
        return None;
    }

    match SqliteReportStore::new(&config.database_path, config.stale_after_hours) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!(
                "Report cache at {} unavailable, continuing without cache: {}",
                config.database_path.display(),
                e
            );
            None
        }
    }
}
