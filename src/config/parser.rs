use crate::config::types::{ScanConfig, Settings};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a settings file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - Failed to load, parse, or validate the settings
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use trust_lens::config::load_settings;
///
/// let settings = load_settings(Path::new("trust-lens.toml")).unwrap();
/// println!("Max pages: {}", settings.crawler.max_pages);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parses and validates settings from TOML text
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate(&settings)?;
    Ok(settings)
}

/// Loads settings from `path` when given, otherwise returns validated defaults
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => load_settings(path),
        None => {
            let settings = Settings::default();
            validate(&settings)?;
            Ok(settings)
        }
    }
}

/// Computes a SHA-256 fingerprint of the crawl limits of a scan
///
/// Two scans of the same site share a cached report only when their
/// fingerprints match.
///
/// # Returns
///
/// Hex-encoded SHA-256 digest (64 characters)
pub fn scan_fingerprint(config: &ScanConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("max-pages={};max-depth={}", config.max_pages, config.max_depth));
    hex::encode(hasher.finalize())
}
