//! Page analyzers
//!
//! Every analyzer has the same capability: look at one loaded page and return
//! the issues found on it. The pipeline runs them concurrently and isolates
//! their failures from each other.
//!
//! Local analyzers work on the served document:
//! - `content`: title, meta description, headings, image alt text, in-page anchors
//! - `viewport`: viewport meta, declared overflow, small fonts
//! - `interactive`: unnamed controls, placeholder links, obstructing overlays
//! - `accessibility`: a WCAG A/AA rule subset
//!
//! `semantic` sends page text to a language model. `network` is not a page
//! analyzer; it turns session-lifetime observations into global issues.

mod accessibility;
mod content;
mod interactive;
mod network;
mod pipeline;
mod sampling;
mod semantic;
mod style;
mod viewport;

pub use accessibility::AccessibilityAnalyzer;
pub use content::ContentAnalyzer;
pub use interactive::InteractiveAnalyzer;
pub use network::{network_issues, SLOW_TTFB_HIGH_MS, SLOW_TTFB_MS};
pub use pipeline::{AnalyzerPipeline, Sampled};
pub use sampling::{is_key_page, AlwaysSample, KeyPageSampler, SamplingPolicy};
pub use semantic::{parse_ai_response, AiIssue, SemanticAnalyzer, SEMANTIC_PROMPT};
pub use viewport::ViewportAnalyzer;

use crate::crawler::PageHandle;
use crate::llm::LlmError;
use crate::model::Issue;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised inside an analyzer
///
/// The pipeline logs these and treats the analyzer as having found nothing.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Page was not loaded")]
    NotLoaded,

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Analysis failed: {0}")]
    Failed(String),
}

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// A per-page analysis
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    /// Inspects a loaded page and returns the issues found on it
    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>>;
}

/// Returns the loaded document, or `AnalyzerError::NotLoaded`
fn loaded_html(page: &PageHandle) -> AnalyzerResult<&str> {
    if page.is_loaded() {
        Ok(page.html())
    } else {
        Err(AnalyzerError::NotLoaded)
    }
}

/// Parses a CSS selector, mapping failures into `AnalyzerError::Selector`
fn css(selector: &str) -> AnalyzerResult<scraper::Selector> {
    crate::crawler::parser::selector(selector)
        .ok_or_else(|| AnalyzerError::Selector(selector.to_string()))
}

/// Collapses whitespace in an element's text
fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::crawler::{PageHandle, PageSnapshot};
    use crate::model::PerfMetrics;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// A loaded page handle serving `html`
    pub fn page(html: &str) -> PageHandle {
        let mut page = PageHandle::new(1, [], Arc::new(AtomicUsize::new(0)));
        page.set_loaded(PageSnapshot {
            final_url: "https://example.com/".to_string(),
            status: 200,
            html: html.to_string(),
            perf: PerfMetrics::default(),
            content_only: false,
        });
        page
    }
}
