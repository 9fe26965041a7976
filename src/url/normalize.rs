//! URL normalization and scan-target validation
//!
//! This module handles:
//! - Canonical form for visited-set identity (one trailing `/` stripped)
//! - Completing a missing scheme with `https://`
//! - Rejecting malformed or doubly-concatenated scan targets

use crate::UrlError;
use url::Url;

/// Returns the canonical form of a URL used for visited-set identity
///
/// Exactly one trailing `/` is stripped, so `http://a.com` and
/// `http://a.com/` are the same entity. Nothing else is rewritten.
///
/// # Examples
///
/// ```
/// use trust_lens::url::canonical_url;
///
/// assert_eq!(canonical_url("http://a.com/"), "http://a.com");
/// assert_eq!(canonical_url("http://a.com/docs/"), "http://a.com/docs");
/// assert_eq!(canonical_url("http://a.com"), "http://a.com");
/// ```
pub fn canonical_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Prefixes `https://` when the input carries no http(s) scheme
pub fn ensure_scheme(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Validates a user-supplied scan target and returns it as an absolute URL
///
/// # Validation Steps
///
/// 1. Reject empty input and input containing whitespace
/// 2. Reject doubly-concatenated URLs (a second `http://` or `https://`
///    before the query string, e.g. `https://a.comhttps://a.com`)
/// 3. Add `https://` when no scheme is present
/// 4. Parse; require an http/https scheme and a non-empty host
///
/// # Arguments
///
/// * `input` - The raw URL as typed by the user
///
/// # Returns
///
/// * `Ok(Url)` - A parsed absolute URL
/// * `Err(UrlError)` - The input is malformed
///
/// # Examples
///
/// ```
/// use trust_lens::url::validate_scan_url;
///
/// assert_eq!(validate_scan_url("example.com").unwrap().as_str(), "https://example.com/");
/// assert!(validate_scan_url("https://a.comhttps://a.com").is_err());
/// ```
pub fn validate_scan_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Malformed("URL is empty".to_string()));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(UrlError::Malformed(format!(
            "URL must not contain whitespace: {}",
            trimmed
        )));
    }

    let lower = trimmed.to_ascii_lowercase();
    let before_query = lower.split(['?', '#']).next().unwrap_or_default();
    let repeated_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| before_query.get(1..).map_or(false, |rest| rest.contains(scheme)));
    if repeated_scheme {
        return Err(UrlError::Malformed(format!(
            "URL appears to be concatenated with another URL: {}",
            trimmed
        )));
    }

    let with_scheme = ensure_scheme(trimmed);
    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    Ok(url)
}
