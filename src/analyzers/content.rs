//! Document structure and content checks

use super::{css, element_text, loaded_html, Analyzer, AnalyzerResult};
use crate::crawler::PageHandle;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashSet;

/// Titles shorter than this are reported
const MIN_TITLE_CHARS: usize = 5;

/// Checks title, meta description, `<h1>` structure, image alt text, and
/// in-page anchor targets
#[derive(Debug, Default)]
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn inspect(html: &str, url: &str) -> AnalyzerResult<Vec<Issue>> {
        let document = Html::parse_document(html);
        let mut issues = Vec::new();

        let title = document
            .select(&css("title")?)
            .next()
            .map(|title| element_text(&title))
            .unwrap_or_default();
        if title.chars().count() < MIN_TITLE_CHARS {
            issues.push(Issue::new(
                Category::Content,
                Severity::Medium,
                url,
                "Page title is too short or missing",
                "Poor SEO and user context.",
                "Add a descriptive <title> tag.",
            ));
        }

        let has_description = document
            .select(&css(r#"meta[name="description"]"#)?)
            .any(|meta| {
                meta.value()
                    .attr("content")
                    .map_or(false, |content| !content.trim().is_empty())
            });
        if !has_description {
            issues.push(Issue::new(
                Category::Content,
                Severity::Medium,
                url,
                "Missing Meta Description",
                "Search engines and social shares will look broken.",
                "Add a <meta name=\"description\"> tag.",
            ));
        }

        match document.select(&css("h1")?).count() {
            0 => issues.push(Issue::new(
                Category::Content,
                Severity::Medium,
                url,
                "No <h1> heading found",
                "Poor document structure and accessibility.",
                "Add exactly one <h1> heading per page.",
            )),
            1 => {}
            _ => issues.push(Issue::new(
                Category::Content,
                Severity::Medium,
                url,
                "Multiple <h1> headings found",
                "Confusing document structure.",
                "Use only one <h1> per page.",
            )),
        }

        let missing_alt = document
            .select(&css("img")?)
            .filter(|img| img.value().attr("alt").map_or(true, |alt| alt.trim().is_empty()))
            .count();
        if missing_alt > 0 {
            issues.push(Issue::new(
                Category::UiUx,
                Severity::Medium,
                url,
                format!("{} images missing alt text", missing_alt),
                "Screen readers cannot describe images to visually impaired users.",
                "Add descriptive \"alt\" attributes to all images.",
            ));
        }

        let targets: HashSet<&str> = document
            .select(&css("[id], a[name]")?)
            .flat_map(|element| {
                let value = element.value();
                [value.attr("id"), value.attr("name")]
            })
            .flatten()
            .collect();

        let mut reported = HashSet::new();
        for anchor in document.select(&css(r##"a[href^="#"]"##)?) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let target = &href[1..];
            if target.is_empty() || target.starts_with('!') || targets.contains(target) {
                continue;
            }
            if !reported.insert(href) {
                continue;
            }
            issues.push(Issue::new(
                Category::Functional,
                Severity::Low,
                url,
                format!("Broken internal anchor link to {}", href),
                "User clicks a link but nothing happens.",
                format!("Ensure the element with id=\"{}\" exists on the page.", target),
            ));
        }

        Ok(issues)
    }
}

#[async_trait]
impl Analyzer for ContentAnalyzer {
    fn name(&self) -> &'static str {
        "content"
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        Self::inspect(loaded_html(page)?, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::page;

    fn descriptions(html: &str) -> Vec<String> {
        ContentAnalyzer::inspect(html, "https://example.com/")
            .unwrap()
            .into_iter()
            .map(|issue| issue.description)
            .collect()
    }

    #[test]
    fn test_clean_page_has_no_issues() {
        let html = r##"<html><head><title>Acme Widgets</title>
            <meta name="description" content="Widgets for everyone"></head>
            <body><h1>Widgets</h1><img src="a.png" alt="A widget">
            <a href="#faq">FAQ</a><section id="faq"></section><a href="#">Top</a></body></html>"##;
        assert!(descriptions(html).is_empty());
    }

    #[test]
    fn test_structure_problems_are_reported() {
        let html = r##"<html><head><title>Hi</title><meta name="description" content=" "></head>
            <body><h1>One</h1><h1>Two</h1><img src="a.png"><img src="b.png" alt="">
            <a href="#missing">x</a><a href="#missing">y</a></body></html>"##;
        let found = descriptions(html);
        assert_eq!(
            found,
            vec![
                "Page title is too short or missing",
                "Missing Meta Description",
                "Multiple <h1> headings found",
                "2 images missing alt text",
                "Broken internal anchor link to #missing",
            ]
        );
    }

    #[test]
    fn test_categories_and_severities() {
        let issues =
            ContentAnalyzer::inspect(r##"<body><img src="x"><a href="#nope">n</a></body>"##, "u")
                .unwrap();
        let alt = issues.iter().find(|i| i.description.contains("alt")).unwrap();
        assert_eq!(alt.category, Category::UiUx);
        assert_eq!(alt.severity, Severity::Medium);
        let anchor = issues.iter().find(|i| i.description.contains("anchor")).unwrap();
        assert_eq!(anchor.category, Category::Functional);
        assert_eq!(anchor.severity, Severity::Low);
        assert!(issues.iter().any(|i| i.description == "No <h1> heading found"));
    }

    #[tokio::test]
    async fn test_unloaded_page_is_an_error() {
        let loaded = page("<title>Example page</title>");
        assert!(ContentAnalyzer::new().analyze(&loaded, "u").await.is_ok());

        let mut failed = page("");
        failed.set_failed("u", "timeout");
        assert!(ContentAnalyzer::new().analyze(&failed, "u").await.is_err());
    }
}
