//! Core data model shared by the crawler, analyzers, and report pipeline
//!
//! All types serialize with camelCase field names so that a `FinalReport`
//! serialized by the HTTP boundary, the JSON writer, and the report cache
//! share one wire shape.
//!
//! # Components
//!
//! - `Issue`, `Category`, `Severity`: a single detected defect
//! - `PageResult`, `PerfMetrics`: the outcome of crawling one page
//! - `HygieneScore`, `ScoreBreakdown`, `Bucket`, `TrustSummary`: scoring output
//! - `FinalReport`, `GraphNode`, `Recommendations`: the assembled report

mod issue;
mod report;

pub use issue::{Category, Issue, PageResult, PerfMetrics, Severity};
pub use report::{
    Bucket, FinalReport, GraphNode, HygieneScore, NodeKind, Recommendations, ScoreBreakdown,
    TrustSummary,
};
