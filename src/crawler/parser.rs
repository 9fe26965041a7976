//! HTML helpers used by the session and the analyzers
//!
//! This module handles parsing HTML content to extract:
//! - Anchor hrefs (deduplicated, in document order)
//! - Subresources a page would load (scripts, stylesheets, media, ...)
//! - Login forms for heuristic form authentication
//! - Visible page text for language-model analysis
//! - A CSS path to the element containing a quoted text fragment
//!
//! `scraper::Html` is not `Send`, so every function here parses and drops the
//! document synchronously and returns owned data.

use crate::crawler::session::ResourceKind;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Upper bound on subresources probed per page
const MAX_SUBRESOURCES: usize = 25;

/// Elements whose text never counts as page content
const NOISE_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "template"];

/// A resource referenced by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subresource {
    pub url: String,
    pub kind: ResourceKind,
}

/// HTTP method a form submits with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// A login form located on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Absolute submission URL
    pub action: String,
    pub method: FormMethod,
    /// Name of the username or email input
    pub username_field: Option<String>,
    /// Name of the password input
    pub password_field: Option<String>,
    /// Name/value of the submit control, when it carries one
    pub submit: Option<(String, String)>,
    /// Whether any submit control was found
    pub has_submit_control: bool,
    /// Hidden inputs (CSRF tokens and the like)
    pub hidden_fields: Vec<(String, String)>,
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extracts every anchor `href` value, deduplicated in document order
///
/// Values are returned as written in the document (trimmed), without
/// resolution.
pub fn extract_anchor_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(anchor) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&anchor)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}

/// Lists subresources referenced by the document, resolved against `base`
pub fn extract_subresources(html: &str, base: &Url) -> Vec<Subresource> {
    let document = Html::parse_document(html);
    let rules: [(&str, &str, ResourceKind); 7] = [
        ("script[src]", "src", ResourceKind::Script),
        ("link[rel~='stylesheet'][href]", "href", ResourceKind::Stylesheet),
        ("link[rel~='preload'][as='font'][href]", "href", ResourceKind::Font),
        ("link[rel~='icon'][href]", "href", ResourceKind::Image),
        ("img[src]", "src", ResourceKind::Image),
        ("video[src], audio[src], source[src]", "src", ResourceKind::Media),
        ("iframe[src]", "src", ResourceKind::Document),
    ];

    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for (css, attr, kind) in rules {
        let Some(sel) = selector(css) else {
            continue;
        };
        for element in document.select(&sel) {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            let Ok(resolved) = base.join(raw.trim()) else {
                continue;
            };
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                continue;
            }
            let url = resolved.to_string();
            if seen.insert(url.clone()) {
                found.push(Subresource { url, kind });
            }
            if found.len() >= MAX_SUBRESOURCES {
                return found;
            }
        }
    }

    found
}

/// Locates a login form heuristically
///
/// The first `<form>` containing a password input is used. Within it the
/// username field is the first email input, then the first input whose name
/// mentions user, login, or email, then the first plain text input.
///
/// # Returns
///
/// * `Some(LoginForm)` - A form with a password input
/// * `None` - No form carries a password input
pub fn find_login_form(html: &str, page_url: &Url) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form_sel = selector("form")?;
    let password_sel = selector("input[type='password']")?;

    let form = document
        .select(&form_sel)
        .find(|form| form.select(&password_sel).next().is_some())?;

    let named = |css: &str| -> Option<String> {
        let sel = selector(css)?;
        form.select(&sel)
            .find_map(|input| input.value().attr("name").map(str::to_string))
    };

    let username_field = named("input[type='email']")
        .or_else(|| named("input[name*='user']"))
        .or_else(|| named("input[name*='login']"))
        .or_else(|| named("input[name*='email']"))
        .or_else(|| named("input[type='text']"))
        .or_else(|| named("input:not([type])"));
    let password_field = named("input[type='password']");

    let submit_sel = selector("button[type='submit'], input[type='submit'], button:not([type])")?;
    let submit_control = form.select(&submit_sel).next();
    let has_submit_control = submit_control.is_some();
    let submit = submit_control.and_then(|control| {
        let name = control.value().attr("name")?;
        let value = control.value().attr("value").unwrap_or_default();
        Some((name.to_string(), value.to_string()))
    });

    let hidden_sel = selector("input[type='hidden'][name]")?;
    let hidden_fields = form
        .select(&hidden_sel)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    let action = form
        .value()
        .attr("action")
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .and_then(|action| page_url.join(action).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| page_url.to_string());

    let method = match form.value().attr("method") {
        Some(method) if method.eq_ignore_ascii_case("get") => FormMethod::Get,
        _ => FormMethod::Post,
    };

    Some(LoginForm {
        action,
        method,
        username_field,
        password_field,
        submit,
        has_submit_control,
        hidden_fields,
    })
}

/// Extracts the visible text of the document body
///
/// Script, style, noscript, iframe, svg, and template content is dropped.
/// Text nodes are trimmed and joined with newlines, then truncated to
/// `max_chars` characters.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let Some(body_sel) = selector("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_sel).next() else {
        return String::new();
    };

    let mut text = String::new();
    for node in body.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let in_noise = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |element| NOISE_ELEMENTS.contains(&element.name()))
        });
        if in_noise {
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(fragment);
    }

    text.chars().take(max_chars).collect::<String>().trim().to_string()
}

/// Returns a CSS path to the first body element whose own text contains `quote`
///
/// Paths stop at the nearest ancestor with an id (`#id`) or at `body`, and
/// use `tag:nth-child(n)` steps below that.
pub fn locate_quote(html: &str, quote: &str) -> Option<String> {
    let quote = quote.trim();
    if quote.is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let body_sel = selector("body")?;
    let body = document.select(&body_sel).next()?;

    let matched = body.descendants().skip(1).find(|node| {
        node.value().is_element()
            && node.children().any(|child| {
                child
                    .value()
                    .as_text()
                    .map_or(false, |text| text.contains(quote))
            })
    })?;

    ElementRef::wrap(matched).map(css_path)
}

fn css_path(element: ElementRef<'_>) -> String {
    if let Some(id) = element.value().id() {
        return format!("#{}", id);
    }

    let tag = element.value().name().to_string();
    if tag == "body" {
        return tag;
    }

    match element.parent().and_then(ElementRef::wrap) {
        Some(parent) => {
            let index = element
                .prev_siblings()
                .filter(|sibling| sibling.value().is_element())
                .count()
                + 1;
            format!("{} > {}:nth-child({})", css_path(parent), tag, index)
        }
        None => tag,
    }
}
