//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates one scan:
//! - Seeding the frontier with the start URL
//! - Draining the frontier in concurrency-bounded batches
//! - Driving navigation and the analyzer pipeline per page
//! - Discovering in-scope links and re-enqueueing them one level deeper

use crate::analyzers::AnalyzerPipeline;
use crate::config::ScanConfig;
use crate::crawler::frontier::{Frontier, QueuedUrl};
use crate::crawler::session::{Session, SessionError};
use crate::model::PageResult;
use crate::url::{resolve_in_scope, validate_scan_url};
use crate::UrlError;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

/// Lifecycle of a coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Running,
    Drained,
}

/// Mutable crawl state shared by the tasks of a batch
#[derive(Debug)]
pub struct CrawlLedger {
    pub frontier: Frontier,
    pub results: Vec<PageResult>,
}

/// Everything a page task needs, cloned once per task
#[derive(Clone)]
struct TaskContext {
    session: Arc<dyn Session>,
    pipeline: Arc<AnalyzerPipeline>,
    ledger: Arc<Mutex<CrawlLedger>>,
    start_url: Arc<Url>,
    max_depth: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: TaskContext,
    concurrency: usize,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a new coordinator seeded with the scan's start URL
    ///
    /// # Arguments
    ///
    /// * `scan` - The scan configuration (start URL and limits)
    /// * `concurrency` - Batch size; clamped to at least 1
    /// * `session` - An initialized session shared by every page task
    /// * `pipeline` - Analyzers run against every visited page
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(UrlError)` - The start URL is not a valid scan target
    pub fn new(
        scan: &ScanConfig,
        concurrency: usize,
        session: Arc<dyn Session>,
        pipeline: Arc<AnalyzerPipeline>,
    ) -> Result<Self, UrlError> {
        let start_url = validate_scan_url(&scan.start_url)?;

        let mut frontier = Frontier::new(scan.max_pages, scan.max_depth);
        frontier.push(start_url.as_str(), 0);

        Ok(Self {
            context: TaskContext {
                session,
                pipeline,
                ledger: Arc::new(Mutex::new(CrawlLedger {
                    frontier,
                    results: Vec::new(),
                })),
                start_url: Arc::new(start_url),
                max_depth: scan.max_depth,
            },
            concurrency: concurrency.max(1),
            state: CrawlState::Idle,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl loop until the frontier is drained or the page cap is hit
    ///
    /// Each batch runs to completion before the next one is pulled. A task
    /// that panics is logged and skipped; a session that can no longer create
    /// pages aborts the run.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageResult>)` - One result per visited page, in completion order
    /// * `Err(SessionError)` - The session failed fatally
    pub async fn run(&mut self) -> Result<Vec<PageResult>, SessionError> {
        self.state = CrawlState::Running;
        tracing::info!(
            "Starting crawl of {} (concurrency {})",
            self.context.start_url,
            self.concurrency
        );

        let start_time = std::time::Instant::now();
        let mut batches = 0usize;

        loop {
            let batch = {
                let mut ledger = self.context.ledger.lock().await;
                if ledger.frontier.should_stop() {
                    break;
                }
                ledger.frontier.pop_batch(self.concurrency)
            };

            batches += 1;
            tracing::debug!("Batch {}: {} URLs", batches, batch.len());

            let mut tasks = JoinSet::new();
            for queued in batch {
                let context = self.context.clone();
                tasks.spawn(async move { process_url(context, queued).await });
            }

            let mut fatal = None;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!("Session failure, aborting crawl: {}", e);
                        fatal.get_or_insert(e);
                    }
                    Err(e) => tracing::error!("Page task panicked: {}", e),
                }
            }
            if let Some(e) = fatal {
                self.state = CrawlState::Drained;
                return Err(e);
            }

            let ledger = self.context.ledger.lock().await;
            tracing::info!(
                "Progress: {} pages visited, {} in frontier",
                ledger.frontier.visited_count(),
                ledger.frontier.queued_count()
            );
        }

        self.state = CrawlState::Drained;

        let results = std::mem::take(&mut self.context.ledger.lock().await.results);
        tracing::info!(
            "Crawl completed: {} pages scanned in {:?}",
            results.len(),
            start_time.elapsed()
        );

        Ok(results)
    }
}

/// Processes a single URL
///
/// This function:
/// 1. Reserves a visited slot (skips if the cap is reached or the URL was taken)
/// 2. Navigates a fresh page
/// 3. Runs the analyzer pipeline
/// 4. Records the page result and enqueues in-scope links
///
/// Navigation failures end the task quietly; only a session that cannot
/// create a page is reported back as an error.
async fn process_url(context: TaskContext, queued: QueuedUrl) -> Result<(), SessionError> {
    {
        let mut ledger = context.ledger.lock().await;
        if ledger.frontier.cap_reached() {
            tracing::trace!("Page cap reached, skipping {}", queued.url);
            return Ok(());
        }
        if !ledger.frontier.try_reserve(&queued.url) {
            tracing::trace!("Already visited, skipping {}", queued.url);
            return Ok(());
        }
    }

    tracing::info!("Crawling: {} (depth {})", queued.url, queued.depth);

    let mut page = context.session.create_page().await?;
    context.session.visit_page(&mut page, &queued.url).await;

    let Some(snapshot) = page.snapshot() else {
        tracing::warn!("Skipping {}: page did not load", queued.url);
        return Ok(());
    };
    let perf = snapshot.perf;
    let page_url = snapshot.final_url.clone();

    let issues = context.pipeline.run(&page, &queued.url).await;
    let hrefs = context.session.extract_links(&page);
    drop(page);

    let links = absolute_links(&hrefs, &page_url);
    let mut ledger = context.ledger.lock().await;

    if queued.depth < context.max_depth {
        let mut enqueued = 0usize;
        for href in &hrefs {
            if let Some(target) = resolve_in_scope(href, &context.start_url) {
                if ledger.frontier.push(&target, queued.depth + 1) {
                    enqueued += 1;
                }
            }
        }
        tracing::debug!("{}: {} links, {} enqueued", queued.url, hrefs.len(), enqueued);
    }

    ledger.results.push(PageResult {
        url: queued.url,
        scanned_at: Utc::now(),
        issues,
        links,
        perf_metrics: Some(perf),
    });

    Ok(())
}

/// Resolves raw hrefs against the page they were found on
///
/// Only http(s) targets are kept; fragments are dropped and duplicates removed.
fn absolute_links(hrefs: &[String], page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    hrefs
        .iter()
        .filter(|href| !href.starts_with('#'))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
