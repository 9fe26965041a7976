//! Output module for writing scan reports
//!
//! This module handles:
//! - Rendering a `FinalReport` as a human-readable markdown document
//! - Writing the report as pretty-printed JSON
//! - Naming report files `trust-report-<timestamp>.<ext>`

mod json;
mod markdown;

pub use json::write_json_report;
pub use markdown::{format_markdown_report, write_markdown_report};

use crate::model::FinalReport;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Which report files to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Both,
}

impl FromStr for ReportFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(OutputError::Format(format!(
                "unknown report format '{}' (expected markdown, json, or both)",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => f.write_str("markdown"),
            Self::Json => f.write_str("json"),
            Self::Both => f.write_str("both"),
        }
    }
}

/// File name stem for a report generated at `at`
pub fn report_stem(at: DateTime<Utc>) -> String {
    format!("trust-report-{}", at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Writes the report in the requested formats
///
/// The output directory is created when missing. Both files of a `Both`
/// write share one timestamped stem.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths written, markdown first
/// * `Err(OutputError)` - Failed to create the directory or write a file
pub fn write_reports(
    report: &FinalReport,
    directory: &Path,
    format: ReportFormat,
) -> OutputResult<Vec<PathBuf>> {
    std::fs::create_dir_all(directory)?;

    let now = Utc::now();
    let stem = report_stem(now);
    let mut written = Vec::new();

    if matches!(format, ReportFormat::Markdown | ReportFormat::Both) {
        let path = directory.join(format!("{}.md", stem));
        write_markdown_report(report, now, &path)?;
        written.push(path);
    }
    if matches!(format, ReportFormat::Json | ReportFormat::Both) {
        let path = directory.join(format!("{}.json", stem));
        write_json_report(report, &path)?;
        written.push(path);
    }

    for path in &written {
        tracing::info!("Report generated: {}", path.display());
    }
    Ok(written)
}
