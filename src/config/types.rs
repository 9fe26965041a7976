use crate::crawler::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default number of pages visited per scan
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Default link depth explored from the start URL
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Default number of pages processed per batch
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Parameters of a single scan
///
/// Created once when a scan starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Absolute start URL; links are scoped to its origin
    pub start_url: String,
    pub max_pages: usize,
    pub max_depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthVariant>,
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl ScanConfig {
    /// Creates a scan configuration with default limits and no authentication
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            auth: None,
            headless: true,
        }
    }

    pub fn with_limits(mut self, max_pages: usize, max_depth: u32) -> Self {
        self.max_pages = max_pages;
        self.max_depth = max_depth;
        self
    }

    pub fn with_auth(mut self, auth: AuthVariant) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Authentication applied to the crawl session
///
/// Exactly one strategy is active per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthVariant {
    /// Form login performed once before crawling
    Basic {
        #[serde(rename = "loginUrl")]
        login_url: String,
        username: String,
        password: String,
    },
    /// Pre-established session state injected into the session
    Cookies {
        cookies: Vec<CookieSpec>,
        #[serde(
            rename = "localStorage",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        local_storage: Option<BTreeMap<String, String>>,
    },
}

/// A cookie to inject before crawling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

/// Tool-wide settings, loaded from an optional TOML file
///
/// Every table and key has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of distinct pages visited
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of pages processed concurrently per batch
    pub concurrency: usize,

    /// Budget for a fully settled page load: document plus subresources (milliseconds)
    #[serde(rename = "quiescence-timeout-ms")]
    pub quiescence_timeout_ms: u64,

    /// Budget for the document-only fallback load (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Resource kinds never fetched while loading a page
    #[serde(rename = "block-resources")]
    pub block_resources: Vec<ResourceKind>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            quiescence_timeout_ms: 5_000,
            navigation_timeout_ms: 30_000,
            block_resources: vec![ResourceKind::Image, ResourceKind::Media, ResourceKind::Font],
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value as `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "TrustLens".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/trust-lens/trust-lens".to_string(),
        }
    }
}

/// Language-model backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,

    pub model: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Page text beyond this many characters is not sent
    #[serde(rename = "max-chars")]
    pub max_chars: usize,

    /// Pages with less text than this are skipped
    #[serde(rename = "min-chars")]
    pub min_chars: usize,

    /// Fraction of non-key pages that are still analyzed
    #[serde(rename = "sample-rate")]
    pub sample_rate: f64,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-flash-latest".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_chars: 15_000,
            min_chars: 50,
            sample_rate: 0.1,
            timeout_secs: 60,
        }
    }
}

/// Report cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// Cached reports older than this are treated as misses
    #[serde(rename = "stale-after-hours")]
    pub stale_after_hours: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: PathBuf::from("./trust-lens.db"),
            stale_after_hours: 24,
        }
    }
}

/// HTTP boundary configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory rendered reports are written to
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./reports"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cookie_path() -> String {
    "/".to_string()
}
