//! Report pipeline: aggregation, scoring, and assembly
//!
//! ```text
//! global issues + page results --merge--> unique issues --calculate--> HygieneScore
//!                                              |                            |
//!                                              +---------assemble-----------+--> FinalReport
//! ```

mod aggregator;
mod assembler;
mod scoring;

pub use aggregator::merge;
pub use assembler::{assemble, closing_insight, CLOSING_CRITICAL, CLOSING_TRUSTWORTHY};
pub use scoring::calculate;

use crate::model::{FinalReport, Issue, PageResult};

/// Builds the final report from a finished crawl
///
/// # Arguments
///
/// * `global_issues` - Page-independent issues gathered for the whole session
/// * `results` - One result per crawled page
pub fn build_report(global_issues: Vec<Issue>, results: &[PageResult]) -> FinalReport {
    let issues = merge(global_issues, results);
    let score = calculate(&issues);
    tracing::info!(
        "Scored {} unique issues: {}/100",
        issues.len(),
        score.total
    );
    assemble(results, issues, score)
}
