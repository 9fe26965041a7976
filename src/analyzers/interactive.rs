//! Interactive element checks: naming, placeholder links, and overlays

use super::style::declared;
use super::{css, element_text, loaded_html, Analyzer, AnalyzerResult};
use crate::crawler::PageHandle;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BUTTONS: &str = r#"button, [role="button"], input[type="button"], input[type="submit"], input[type="reset"]"#;

/// Checks that controls can be identified and that nothing covers the page
#[derive(Debug, Default)]
pub struct InteractiveAnalyzer;

impl InteractiveAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn inspect(html: &str, url: &str) -> AnalyzerResult<Vec<Issue>> {
        let document = Html::parse_document(html);
        let mut issues = Vec::new();

        let unnamed_buttons = document
            .select(&css(BUTTONS)?)
            .filter(|button| !has_accessible_name(button))
            .count();
        if unnamed_buttons > 0 {
            issues.push(Issue::new(
                Category::UiUx,
                Severity::Medium,
                url,
                format!("{} buttons without an accessible name", unnamed_buttons),
                "Users cannot tell what these controls do, and screen readers announce them as \"button\".",
                "Give every button visible text, an aria-label, or a title.",
            ));
        }

        let unnamed_links = document
            .select(&css("a[href]")?)
            .filter(|link| !has_accessible_name(link))
            .count();
        if unnamed_links > 0 {
            issues.push(Issue::new(
                Category::UiUx,
                Severity::Medium,
                url,
                format!("{} links without discernible text", unnamed_links),
                "Users cannot tell where these links lead.",
                "Add link text, an aria-label, or alt text on linked images.",
            ));
        }

        let placeholders = document
            .select(&css("a[href]")?)
            .filter(|link| is_placeholder_link(link))
            .count();
        if placeholders > 0 {
            issues.push(Issue::new(
                Category::Functional,
                Severity::Low,
                url,
                format!("{} placeholder links that do not navigate", placeholders),
                "Links that look clickable lead nowhere, which feels broken.",
                "Point links at real destinations or use a <button> for in-page actions.",
            ));
        }

        if document.select(&css("[style]")?).any(|element| is_blocking_overlay(&element)) {
            issues.push(Issue::new(
                Category::UiUx,
                Severity::High,
                url,
                "Full-viewport overlay obstructs page content",
                "Visitors must dismiss an overlay before they can read or use the page.",
                "Avoid covering the whole viewport on load; use inline banners or dismissible dialogs.",
            ));
        }

        Ok(issues)
    }
}

fn has_accessible_name(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    let attribute_named = ["aria-label", "aria-labelledby", "title", "value"]
        .iter()
        .filter(|attribute| **attribute != "value" || value.name() == "input")
        .any(|attribute| value.attr(attribute).map_or(false, |v| !v.trim().is_empty()));
    if attribute_named {
        return true;
    }

    if !element_text(element).is_empty() {
        return true;
    }

    crate::crawler::parser::selector("img[alt]").map_or(false, |images| {
        element.select(&images).any(|img| {
            img.value()
                .attr("alt")
                .map_or(false, |alt| !alt.trim().is_empty())
        })
    })
}

fn is_placeholder_link(link: &ElementRef<'_>) -> bool {
    let value = link.value();
    if value.attr("onclick").is_some() || value.attr("role") == Some("button") {
        return false;
    }
    let href = value.attr("href").unwrap_or_default().trim().to_ascii_lowercase();
    href == "#" || href.starts_with("javascript:")
}

fn is_blocking_overlay(element: &ElementRef<'_>) -> bool {
    let style = element.value().attr("style").unwrap_or_default();

    let fixed = declared(style, "position").map_or(false, |p| p.eq_ignore_ascii_case("fixed"));
    let hidden = declared(style, "display").map_or(false, |d| d.eq_ignore_ascii_case("none"))
        || declared(style, "visibility").map_or(false, |v| v.eq_ignore_ascii_case("hidden"));
    if !fixed || hidden {
        return false;
    }

    let full = |property: &str, units: &[&str]| {
        declared(style, property).map_or(false, |value| units.contains(&value))
    };
    let covers_by_size = full("width", &["100%", "100vw"]) && full("height", &["100%", "100vh"]);
    let covers_by_inset = declared(style, "inset").map_or(false, |inset| {
        inset.split_whitespace().all(|part| part == "0" || part == "0px")
    }) || ["top", "right", "bottom", "left"]
        .iter()
        .all(|side| full(*side, &["0", "0px"]));

    covers_by_size || covers_by_inset
}

#[async_trait]
impl Analyzer for InteractiveAnalyzer {
    fn name(&self) -> &'static str {
        "interactive"
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        Self::inspect(loaded_html(page)?, url)
    }
}
