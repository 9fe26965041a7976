//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ReportStore trait.

use crate::model::FinalReport;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ReportStore, StorageError, StorageResult};
use crate::url::canonical_url;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite report cache
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
    stale_after: Duration,
}

impl SqliteReportStore {
    /// Opens or creates the cache database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `stale_after_hours` - Reports older than this are treated as misses
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteReportStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path, stale_after_hours: u32) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::from_connection(conn, stale_after_hours))
    }

    /// Creates an in-memory database
    pub fn new_in_memory(stale_after_hours: u32) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn, stale_after_hours))
    }

    fn from_connection(conn: Connection, stale_after_hours: u32) -> Self {
        Self {
            conn: Mutex::new(conn),
            stale_after: Duration::hours(i64::from(stale_after_hours)),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored reports, fresh or stale
    pub fn report_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Deletes every report older than the staleness window
    ///
    /// # Returns
    ///
    /// The number of reports removed
    pub fn purge_stale(&self) -> StorageResult<usize> {
        let cutoff = (Utc::now() - self.stale_after).to_rfc3339();
        let removed = self
            .conn()
            .execute("DELETE FROM reports WHERE created_at < ?1", params![cutoff])?;
        Ok(removed)
    }

    fn insert_at(
        &self,
        url: &str,
        fingerprint: &str,
        report: &FinalReport,
        created_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let json = serde_json::to_string(report)?;
        self.conn().execute(
            "INSERT INTO reports (url_key, fingerprint, created_at, total_score, trust_summary, pages_scanned, report_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                canonical_url(url),
                fingerprint,
                created_at.to_rfc3339(),
                report.score.total,
                report.trust_summary.label(),
                report.pages_scanned as i64,
                json
            ],
        )?;
        Ok(())
    }
}

impl ReportStore for SqliteReportStore {
    fn get_report(&self, url: &str, fingerprint: &str) -> StorageResult<Option<FinalReport>> {
        let key = canonical_url(url);
        let row: Option<(String, String)> = self
            .conn()
            .query_row(
                "SELECT created_at, report_json FROM reports
                 WHERE url_key = ?1 AND fingerprint = ?2
                 ORDER BY created_at DESC LIMIT 1",
                params![key, fingerprint],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((created_at, json)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StorageError::Timestamp(e.to_string()))?
            .with_timezone(&Utc);
        let age = Utc::now() - created_at;
        if age >= self.stale_after {
            tracing::debug!("Cached report for {} is stale ({}h old)", key, age.num_hours());
            return Ok(None);
        }

        tracing::debug!("Cache hit for {} ({} minutes old)", key, age.num_minutes());
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save_report(&self, url: &str, fingerprint: &str, report: &FinalReport) -> StorageResult<()> {
        self.insert_at(url, fingerprint, report, Utc::now())?;

        let removed = self.purge_stale()?;
        if removed > 0 {
            tracing::debug!("Removed {} stale cached reports", removed);
        }
        Ok(())
    }
}
