//! Markdown report generation
//!
//! This module renders a human-readable trust and hygiene report: the score
//! and its breakdown, the executive summary, critical issues, every issue in
//! detail, and remediation grouped by urgency.

use crate::model::{Bucket, FinalReport};
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report to `output_path`
///
/// # Arguments
///
/// * `report` - The report to render
/// * `scan_date` - Timestamp shown as the scan date
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the file
pub fn write_markdown_report(
    report: &FinalReport,
    scan_date: DateTime<Utc>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(report, scan_date);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report as markdown
pub fn format_markdown_report(report: &FinalReport, scan_date: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# Website Trust & Hygiene Report\n\n");
    let _ = writeln!(md, "**Scan Date:** {}  ", scan_date.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(md, "**Hygiene Score:** {}/100  ", report.score.total);
    let _ = writeln!(md, "**Trust Level:** {}  ", report.trust_summary);
    let _ = writeln!(md, "**Pages Scanned:** {}\n", report.pages_scanned);

    md.push_str("## Score Breakdown\n\n");
    for bucket in Bucket::ALL {
        let _ = writeln!(
            md,
            "- **{}:** {}/{}",
            bucket.label(),
            report.score.breakdown.get(bucket),
            bucket.weight()
        );
    }
    md.push_str("\n---\n\n");

    md.push_str("## Executive Summary\n\n");
    let _ = writeln!(md, "{}\n", report.closing_insight);

    md.push_str("## Critical Trust-Breaking Issues\n\n");
    if report.critical_issues.is_empty() {
        md.push_str("No critical issues detected.\n");
    } else {
        for issue in &report.critical_issues {
            let _ = writeln!(md, "- [HIGH] {} ({})", issue.description, issue.url);
        }
    }
    md.push('\n');

    md.push_str("## Detailed Issues\n\n");
    if report.issues.is_empty() {
        md.push_str("No issues found.\n\n");
    }
    for issue in &report.issues {
        let _ = writeln!(md, "### [{}] {}", issue.severity, issue.description);
        let _ = writeln!(md, "- **Category:** {}", issue.category);
        let _ = writeln!(md, "- **URL:** {}", issue.url);
        let _ = writeln!(md, "- **User Impact:** {}", issue.user_impact);
        let _ = writeln!(md, "- **Recommendation:** {}", issue.remediation);
        if let Some(location) = &issue.location {
            let _ = writeln!(md, "- **Location:** `{}`", location);
        }
        if let Some(snippet) = &issue.snippet {
            let _ = writeln!(md, "- **Quote:** \"{}\"", snippet);
        }
        md.push('\n');
    }

    md.push_str("## Recommendations\n\n");
    let horizons = [
        ("Immediate", &report.recommendations.immediate),
        ("Short-term", &report.recommendations.short_term),
        ("Long-term", &report.recommendations.long_term),
    ];
    for (title, items) in horizons {
        let _ = writeln!(md, "### {}\n", title);
        if items.is_empty() {
            md.push_str("- None\n");
        }
        for item in items {
            let _ = writeln!(md, "- {}", item);
        }
        md.push('\n');
    }

    md
}
