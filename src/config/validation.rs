use crate::config::types::{
    AuthVariant, CacheConfig, CrawlerConfig, LlmConfig, ScanConfig, ServerConfig, Settings,
    UserAgentConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire settings tree
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_config(&settings.crawler)?;
    validate_user_agent_config(&settings.user_agent)?;
    validate_llm_config(&settings.llm)?;
    validate_cache_config(&settings.cache)?;
    validate_server_config(&settings.server)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.quiescence_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "quiescence-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.navigation_timeout_ms < config.quiescence_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms ({}ms) must not be shorter than quiescence-timeout-ms ({}ms)",
            config.navigation_timeout_ms, config.quiescence_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates language-model configuration
fn validate_llm_config(config: &LlmConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.sample_rate) {
        return Err(ConfigError::Validation(format!(
            "sample-rate must be between 0.0 and 1.0, got {}",
            config.sample_rate
        )));
    }

    if config.max_chars == 0 || config.min_chars > config.max_chars {
        return Err(ConfigError::Validation(format!(
            "min-chars ({}) must not exceed max-chars ({}), and max-chars must be > 0",
            config.min_chars, config.max_chars
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid llm base-url: {}", e)))?;

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.enabled && config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty when the cache is enabled".to_string(),
        ));
    }

    if config.stale_after_hours < 1 {
        return Err(ConfigError::Validation(
            "stale-after-hours must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("bind must be a socket address, got '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Validates the parameters of a single scan
pub fn validate_scan(config: &ScanConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "maxPages must be >= 1, got {}",
            config.max_pages
        )));
    }

    let start = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.start_url, e)))?;
    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start URL must use http or https: {}",
            config.start_url
        )));
    }

    match &config.auth {
        Some(AuthVariant::Basic {
            login_url,
            username,
            password,
        }) => {
            Url::parse(login_url)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid loginUrl: {}", e)))?;
            if username.is_empty() || password.is_empty() {
                return Err(ConfigError::Validation(
                    "basic auth requires a non-empty username and password".to_string(),
                ));
            }
        }
        Some(AuthVariant::Cookies { cookies, .. }) => {
            if let Some(cookie) = cookies.iter().find(|c| c.name.is_empty() || c.domain.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "cookie entries require a name and a domain, got name='{}' domain='{}'",
                    cookie.name, cookie.domain
                )));
            }
        }
        None => {}
    }

    Ok(())
}
