//! Configuration module for Trust-Lens
//!
//! This module holds the per-scan parameters (`ScanConfig`, `AuthVariant`)
//! and the tool-wide `Settings`, loaded from an optional TOML file.
//!
//! # Example
//!
//! ```no_run
//! use trust_lens::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("trust-lens.toml")).unwrap();
//! println!("Scans will visit up to {} pages", settings.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuthVariant, CacheConfig, CookieSpec, CrawlerConfig, LlmConfig, OutputConfig, ScanConfig,
    ServerConfig, Settings, UserAgentConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_PAGES,
};

// Re-export parser functions
pub use parser::{load_settings, load_settings_or_default, parse_settings, scan_fingerprint};
pub use validation::validate_scan;
