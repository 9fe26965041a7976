//! Trust-Lens main entry point
//!
//! This is the command-line interface for the Trust-Lens website scanner.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trust_lens::config::{load_settings_or_default, ScanConfig, Settings};
use trust_lens::output::{write_reports, ReportFormat};
use trust_lens::scan::{run_scan, ScanOptions};
use trust_lens::server::{serve, AppState};
use trust_lens::url::validate_scan_url;

/// Trust-Lens: a website trust and hygiene scanner
///
/// Trust-Lens crawls a website within its origin, audits every page for
/// functional, accessibility, content, and trust problems, and produces a
/// weighted hygiene score with a report.
#[derive(Parser, Debug)]
#[command(name = "trust-lens")]
#[command(version = "1.0.0")]
#[command(about = "A website trust and hygiene scanner", long_about = None)]
struct Cli {
    /// Path to TOML settings file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a website and write a report
    Scan {
        /// Start URL; `https://` is assumed when no scheme is given
        url: String,

        /// Maximum number of pages visited
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth from the start URL
        #[arg(long)]
        max_depth: Option<u32>,

        /// Run the session headless
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        headless: bool,

        /// Directory the report is written to
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Report format: markdown, json, or both
        #[arg(long, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Neither read nor write the report cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Serve the scan API over HTTP
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load settings from {}", path.display()),
        None => "Failed to load default settings".to_string(),
    })?;

    match cli.command {
        Command::Scan {
            url,
            max_pages,
            max_depth,
            headless,
            output,
            format,
            no_cache,
        } => {
            let scan = ScanConfig {
                start_url: url,
                max_pages: max_pages.unwrap_or(settings.crawler.max_pages),
                max_depth: max_depth.unwrap_or(settings.crawler.max_depth),
                auth: None,
                headless,
            };
            let output = output.unwrap_or_else(|| settings.output.directory.clone());
            handle_scan(scan, settings, output, format, no_cache).await
        }
        Command::Serve { bind } => handle_serve(settings, bind).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            // Only show errors
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("trust_lens=info,warn"),
                1 => EnvFilter::new("trust_lens=debug,info"),
                2 => EnvFilter::new("trust_lens=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `scan` subcommand
async fn handle_scan(
    scan: ScanConfig,
    settings: Settings,
    output: PathBuf,
    format: ReportFormat,
    no_cache: bool,
) -> anyhow::Result<()> {
    // Reject malformed input before any session is launched
    let start = validate_scan_url(&scan.start_url)
        .with_context(|| format!("Invalid URL: {}", scan.start_url))?;
    tracing::info!(
        "Scanning {} (max pages {}, max depth {})",
        start,
        scan.max_pages,
        scan.max_depth
    );

    let mut options = ScanOptions::from_settings(&settings);
    if no_cache {
        options = options.without_cache();
    }

    let report = run_scan(&scan, &settings, &options)
        .await
        .with_context(|| format!("Scan of {} failed", start))?;

    let written = write_reports(&report, &output, format)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    println!("Hygiene Score: {}/100", report.score.total);
    println!("Trust: {}", report.trust_summary.label());
    println!("Pages scanned: {}", report.pages_scanned);
    for path in written {
        println!("Report: {}", path.display());
    }

    Ok(())
}

/// Handles the `serve` subcommand
async fn handle_serve(settings: Settings, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    let options = ScanOptions::from_settings(&settings);
    serve(listener, AppState::new(settings, options))
        .await
        .context("Server stopped unexpectedly")
}
