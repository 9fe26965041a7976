//! Trust-Lens: a website trust and hygiene scanner
//!
//! This crate crawls a website breadth-first within its origin, runs a set of
//! page analyzers against every visited page, merges and deduplicates their
//! findings, and turns them into a weighted hygiene score and trust report.

pub mod analyzers;
pub mod config;
pub mod crawler;
pub mod llm;
pub mod model;
pub mod output;
pub mod report;
pub mod scan;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Trust-Lens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Session error: {0}")]
    Session(#[from] crawler::SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Language model error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Trust-Lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ScanConfig, Settings};
pub use model::{FinalReport, Issue};
pub use scan::{run_scan, ScanOptions};
