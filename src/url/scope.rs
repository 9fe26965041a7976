//! Link scoping relative to the scan's start URL
//!
//! Discovered hrefs are resolved against the start URL and kept only when
//! they stay on its origin.

use url::Url;

/// Returns true when both URLs share scheme, host, and port
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Resolves a discovered href against the start URL, keeping only in-scope links
///
/// Returns None if the link should not be crawled:
/// - empty, fragment-only, `javascript:`, `mailto:`, `tel:`, `data:` hrefs
/// - absolute or protocol-relative URLs on a different origin
/// - anything that does not resolve to an http(s) URL
///
/// Relative hrefs resolve against `start`, not against the page they were
/// found on. Fragments are removed from the result.
///
/// # Examples
///
/// ```
/// use trust_lens::url::resolve_in_scope;
/// use url::Url;
///
/// let start = Url::parse("https://example.com").unwrap();
/// assert_eq!(
///     resolve_in_scope("/about", &start).as_deref(),
///     Some("https://example.com/about")
/// );
/// assert_eq!(resolve_in_scope("https://other.org/", &start), None);
/// ```
pub fn resolve_in_scope(href: &str, start: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut resolved = match Url::parse(href) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => start.join(href).ok()?,
        Err(_) => return None,
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if !is_same_origin(&resolved, start) {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Returns the path component of a URL for use as a graph label
///
/// Falls back to the input when it does not parse.
pub fn path_label(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}
