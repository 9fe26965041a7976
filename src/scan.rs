//! End-to-end scan runner
//!
//! Ties the pieces together: cache lookup, session lifetime, crawl,
//! aggregation, scoring, assembly, and cache save.

use crate::analyzers::{
    network_issues, AccessibilityAnalyzer, Analyzer, AnalyzerPipeline, ContentAnalyzer,
    InteractiveAnalyzer, KeyPageSampler, Sampled, SemanticAnalyzer, ViewportAnalyzer,
};
use crate::config::{scan_fingerprint, validate_scan, AuthVariant, LlmConfig, ScanConfig, Settings};
use crate::crawler::{Coordinator, HttpSession, Session};
use crate::llm::{GeminiClient, LanguageModel};
use crate::model::FinalReport;
use crate::report::build_report;
use crate::storage::{open_report_store, ReportStore};
use crate::url::validate_scan_url;
use std::sync::Arc;

/// Collaborators a scan may use, all optional
#[derive(Clone, Default)]
pub struct ScanOptions {
    /// Report cache; `None` runs uncached
    pub store: Option<Arc<dyn ReportStore>>,
    /// Backend for semantic analysis; `None` disables it
    pub model: Option<Arc<dyn LanguageModel>>,
}

impl ScanOptions {
    /// Opens the configured cache and language model
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            store: open_report_store(&settings.cache),
            model: GeminiClient::from_env(&settings.llm)
                .map(|client| Arc::new(client) as Arc<dyn LanguageModel>),
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.store = None;
        self
    }
}

/// Builds the per-page analyzer pipeline
///
/// Semantic analysis runs on key pages and a random sample of the rest.
pub fn build_pipeline(llm: &LlmConfig, model: Option<Arc<dyn LanguageModel>>) -> AnalyzerPipeline {
    let semantic: Arc<dyn Analyzer> = Arc::new(SemanticAnalyzer::new(model, llm));
    AnalyzerPipeline::new(vec![
        Arc::new(ContentAnalyzer::new()),
        Arc::new(InteractiveAnalyzer::new()),
        Arc::new(ViewportAnalyzer::new()),
        Arc::new(AccessibilityAnalyzer::new()),
        Arc::new(Sampled::new(
            semantic,
            Arc::new(KeyPageSampler::new(llm.sample_rate)),
        )),
    ])
}

/// Scans a site over HTTP
///
/// # Arguments
///
/// * `scan` - Start URL, limits, and authentication; a missing scheme is
///   completed to `https://`
/// * `settings` - Tool-wide settings
/// * `options` - Optional cache and language model
///
/// # Returns
///
/// * `Ok(FinalReport)` - The freshly built or cached report
/// * `Err(LensError)` - Invalid input or a fatal session failure
pub async fn run_scan(
    scan: &ScanConfig,
    settings: &Settings,
    options: &ScanOptions,
) -> crate::Result<FinalReport> {
    let scan = normalize_scan(scan)?;
    let session = Arc::new(HttpSession::new(
        &scan,
        settings.crawler.clone(),
        settings.user_agent.clone(),
    ));
    run_scan_with_session(&scan, settings, options, session).await
}

/// Scans a site through the given session
///
/// The session is closed on every path once it has been handed over,
/// including when initialization or the crawl fails.
pub async fn run_scan_with_session(
    scan: &ScanConfig,
    settings: &Settings,
    options: &ScanOptions,
    session: Arc<dyn Session>,
) -> crate::Result<FinalReport> {
    let scan = normalize_scan(scan)?;
    let fingerprint = scan_fingerprint(&scan);
    // Authenticated views are never shared through the cache
    let store = options.store.as_ref().filter(|_| scan.auth.is_none());

    if let Some(store) = store {
        match store.get_report(&scan.start_url, &fingerprint) {
            Ok(Some(report)) => {
                tracing::info!("Serving cached report for {}", scan.start_url);
                if let Err(e) = session.close().await {
                    tracing::warn!("Failed to close session: {}", e);
                }
                return Ok(report);
            }
            Ok(None) => tracing::debug!("No fresh cached report for {}", scan.start_url),
            Err(e) => tracing::warn!("Cache lookup failed, scanning uncached: {}", e),
        }
    }

    let outcome = crawl(&scan, settings, options, Arc::clone(&session)).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close session: {}", e);
    }

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scan of {} failed: {}", scan.start_url, e);
            return Err(e);
        }
    };

    if let Some(store) = store {
        if let Err(e) = store.save_report(&scan.start_url, &fingerprint, &report) {
            tracing::warn!("Failed to cache report for {}: {}", scan.start_url, e);
        }
    }

    tracing::info!(
        "Scan of {} complete: {} pages, score {}/100 ({})",
        scan.start_url,
        report.pages_scanned,
        report.score.total,
        report.trust_summary.label()
    );
    Ok(report)
}

async fn crawl(
    scan: &ScanConfig,
    settings: &Settings,
    options: &ScanOptions,
    session: Arc<dyn Session>,
) -> crate::Result<FinalReport> {
    session.init().await?;

    if matches!(scan.auth, Some(AuthVariant::Basic { .. })) {
        let mut page = session.create_page().await?;
        session.perform_login(&mut page).await;
    }

    let pipeline = Arc::new(build_pipeline(&settings.llm, options.model.clone()));
    tracing::debug!("Analyzers: {:?}", pipeline.names());

    let mut coordinator = Coordinator::new(
        scan,
        settings.crawler.concurrency,
        Arc::clone(&session),
        pipeline,
    )?;
    let results = coordinator.run().await?;

    let global = network_issues(&session.drain_events());
    Ok(build_report(global, &results))
}

fn normalize_scan(scan: &ScanConfig) -> crate::Result<ScanConfig> {
    let start = validate_scan_url(&scan.start_url)?;
    let scan = ScanConfig {
        start_url: start.to_string(),
        ..scan.clone()
    };
    validate_scan(&scan)?;
    Ok(scan)
}
