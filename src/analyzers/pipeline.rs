//! Concurrent analyzer fan-out with failure isolation

use super::{Analyzer, AnalyzerResult, SamplingPolicy};
use crate::crawler::PageHandle;
use crate::model::Issue;
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Runs a fixed set of analyzers against each page
///
/// Every analyzer runs concurrently on the same page. An analyzer that
/// returns an error or panics contributes no issues; the others are
/// unaffected, and so is the page.
pub struct AnalyzerPipeline {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerPipeline {
    pub fn new(analyzers: Vec<Arc<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Names of the registered analyzers, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|analyzer| analyzer.name()).collect()
    }

    /// Runs every analyzer and concatenates their issues in registration order
    pub async fn run(&self, page: &PageHandle, url: &str) -> Vec<Issue> {
        let runs = self.analyzers.iter().map(|analyzer| async move {
            let outcome = AssertUnwindSafe(analyzer.analyze(page, url))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(issues)) => {
                    tracing::debug!("{} found {} issues on {}", analyzer.name(), issues.len(), url);
                    issues
                }
                Ok(Err(e)) => {
                    tracing::warn!("Analyzer {} failed on {}: {}", analyzer.name(), url, e);
                    Vec::new()
                }
                Err(_) => {
                    tracing::error!("Analyzer {} panicked on {}", analyzer.name(), url);
                    Vec::new()
                }
            }
        });

        join_all(runs).await.into_iter().flatten().collect()
    }
}

/// Restricts an analyzer to the pages a sampling policy selects
pub struct Sampled {
    inner: Arc<dyn Analyzer>,
    policy: Arc<dyn SamplingPolicy>,
}

impl Sampled {
    pub fn new(inner: Arc<dyn Analyzer>, policy: Arc<dyn SamplingPolicy>) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Analyzer for Sampled {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        if !self.policy.should_analyze(url) {
            tracing::debug!("Skipping {} on {} (not sampled)", self.inner.name(), url);
            return Ok(Vec::new());
        }
        self.inner.analyze(page, url).await
    }
}
