//! Mobile layout checks: viewport meta, declared overflow, and small fonts

use super::style::{declared, length_px, rules, selects};
use super::{css, loaded_html, Analyzer, AnalyzerResult};
use crate::crawler::PageHandle;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

/// Width of the reference viewport pages are checked against
pub const REFERENCE_VIEWPORT_PX: f64 = 1280.0;

/// Paragraph text below this size is reported
pub const MIN_FONT_PX: f64 = 12.0;

/// Elements whose `width` attribute sets their rendered width
const SIZED_ELEMENTS: &str = "img[width], table[width], iframe[width], video[width], canvas[width], embed[width]";

/// Checks viewport configuration, horizontal overflow, and paragraph font size
#[derive(Debug, Default)]
pub struct ViewportAnalyzer;

impl ViewportAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn inspect(html: &str, url: &str) -> AnalyzerResult<Vec<Issue>> {
        let document = Html::parse_document(html);
        let mut issues = Vec::new();

        if has_overflow(&document)? {
            issues.push(ui_issue(
                url,
                "Horizontal Scroll detected (Content overflow)",
                "Page is wider than the screen, breaking mobile layout.",
                "Fix CSS width constraints or overflow properties.",
            ));
        }

        if document
            .select(&css(r#"meta[name="viewport"]"#)?)
            .next()
            .is_none()
        {
            issues.push(ui_issue(
                url,
                "Missing Viewport Meta Tag",
                "Page will not scale correctly on mobile devices.",
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            ));
        }

        if let Some(size) = paragraph_font_px(&document)? {
            if size < MIN_FONT_PX {
                issues.push(ui_issue(
                    url,
                    "Font size is too small (< 12px)",
                    "Hard to read for many users.",
                    "Increase base font size.",
                ));
            }
        }

        Ok(issues)
    }
}

fn ui_issue(url: &str, description: &str, impact: &str, remediation: &str) -> Issue {
    Issue::new(Category::UiUx, Severity::High, url, description, impact, remediation)
}

/// True when any element declares a width beyond the reference viewport
fn has_overflow(document: &Html) -> AnalyzerResult<bool> {
    let attribute_overflow = document.select(&css(SIZED_ELEMENTS)?).any(|element| {
        element
            .value()
            .attr("width")
            .and_then(|width| width.trim().trim_end_matches("px").parse::<f64>().ok())
            .map_or(false, |width| width > REFERENCE_VIEWPORT_PX)
    });
    if attribute_overflow {
        return Ok(true);
    }

    Ok(document.select(&css("[style]")?).any(|element| {
        let style = element.value().attr("style").unwrap_or_default();
        ["width", "min-width"].iter().any(|property| {
            declared(style, property)
                .and_then(length_px)
                .map_or(false, |width| width > REFERENCE_VIEWPORT_PX)
        })
    }))
}

/// Font size of the first paragraph, when it can be resolved statically
///
/// Inline styles on the paragraph and its ancestors win; otherwise the last
/// `p`, then `body`, then `html` rule in the page's `<style>` blocks applies.
fn paragraph_font_px(document: &Html) -> AnalyzerResult<Option<f64>> {
    let Some(paragraph) = document.select(&css("p")?).next() else {
        return Ok(None);
    };

    let inline = std::iter::once(paragraph)
        .chain(paragraph.ancestors().filter_map(ElementRef::wrap))
        .find_map(|element| {
            element
                .value()
                .attr("style")
                .and_then(|style| declared(style, "font-size"))
                .and_then(length_px)
        });
    if inline.is_some() {
        return Ok(inline);
    }

    let stylesheet: String = document
        .select(&css("style")?)
        .flat_map(|style| style.text())
        .collect::<Vec<_>>()
        .join("\n");
    let parsed = rules(&stylesheet);

    Ok(["p", "body", "html"].iter().find_map(|name| {
        parsed
            .iter()
            .filter(|(selectors, _)| selects(selectors, name))
            .filter_map(|(_, block)| declared(block, "font-size").and_then(length_px))
            .last()
    }))
}

#[async_trait]
impl Analyzer for ViewportAnalyzer {
    fn name(&self) -> &'static str {
        "viewport"
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        Self::inspect(loaded_html(page)?, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: &str = r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#;

    fn descriptions(html: &str) -> Vec<String> {
        ViewportAnalyzer::inspect(html, "https://example.com/")
            .unwrap()
            .into_iter()
            .map(|issue| issue.description)
            .collect()
    }

    #[test]
    fn test_responsive_page_passes() {
        let html = format!(
            "<html><head>{}<style>p {{ font-size: 16px }}</style></head><body><p>Hello</p><img width=\"640\"></body></html>",
            VIEWPORT
        );
        assert!(descriptions(&html).is_empty());
    }

    #[test]
    fn test_missing_viewport_meta() {
        assert_eq!(
            descriptions("<html><body><p>Hi</p></body></html>"),
            vec!["Missing Viewport Meta Tag"]
        );
    }

    #[test]
    fn test_declared_overflow() {
        let by_attribute = format!("<head>{}</head><body><table width=\"1600\"></table></body>", VIEWPORT);
        assert_eq!(descriptions(&by_attribute), vec!["Horizontal Scroll detected (Content overflow)"]);

        let by_style = format!("<head>{}</head><body><div style=\"min-width: 1440px\"></div></body>", VIEWPORT);
        assert_eq!(descriptions(&by_style), vec!["Horizontal Scroll detected (Content overflow)"]);
    }

    #[test]
    fn test_small_fonts() {
        let inline = format!("<head>{}</head><body style=\"font-size: 10px\"><p>tiny</p></body>", VIEWPORT);
        assert_eq!(descriptions(&inline), vec!["Font size is too small (< 12px)"]);

        let sheet = format!("<head>{}<style>body {{ font-size: 0.625rem }}</style></head><body><p>tiny</p></body>", VIEWPORT);
        assert_eq!(descriptions(&sheet), vec!["Font size is too small (< 12px)"]);

        let overridden = format!(
            "<head>{}<style>body {{ font-size: 10px }}</style></head><body><p style=\"font-size: 14px\">ok</p></body>",
            VIEWPORT
        );
        assert!(descriptions(&overridden).is_empty());
    }

    #[test]
    fn test_issues_are_high_ui_ux() {
        let issues = ViewportAnalyzer::inspect("<p>x</p>", "u").unwrap();
        assert!(issues
            .iter()
            .all(|issue| issue.category == Category::UiUx && issue.severity == Severity::High));
    }
}
