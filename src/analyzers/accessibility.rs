//! Native WCAG 2.1 A/AA rule subset
//!
//! Each failing rule produces one issue carrying up to three offending
//! element snippets as JSON evidence. Rules rated critical or serious are
//! reported as High severity, the rest as Medium.

use super::{css, loaded_html, Analyzer, AnalyzerResult};
use crate::crawler::PageHandle;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::collections::{HashMap, HashSet};

/// Offending elements kept as evidence per rule
const MAX_EVIDENCE_NODES: usize = 3;

/// Evidence snippets longer than this are cut
const MAX_SNIPPET_CHARS: usize = 200;

const RULE_HELP_BASE: &str = "https://dequeuniversity.com/rules/axe/4.8";

/// How badly a rule violation affects users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl Impact {
    fn severity(self) -> Severity {
        match self {
            Self::Critical | Self::Serious => Severity::High,
            Self::Moderate | Self::Minor => Severity::Medium,
        }
    }
}

/// A failed rule and the elements that failed it
struct Violation {
    rule: &'static str,
    impact: Impact,
    help: &'static str,
    description: &'static str,
    nodes: Vec<String>,
}

impl Violation {
    fn into_issue(self, url: &str) -> Issue {
        let evidence = serde_json::to_string(&self.nodes).unwrap_or_else(|_| "[]".to_string());
        Issue::new(
            Category::Accessibility,
            self.impact.severity(),
            url,
            self.help,
            self.description,
            format!("See: {}/{}", RULE_HELP_BASE, self.rule),
        )
        .with_evidence(evidence)
    }
}

/// Runs the accessibility rule set against the served document
#[derive(Debug, Default)]
pub struct AccessibilityAnalyzer;

impl AccessibilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn inspect(html: &str, url: &str) -> AnalyzerResult<Vec<Issue>> {
        let document = Html::parse_document(html);

        let violations = [
            html_has_lang(&document)?,
            form_labels(&document)?,
            duplicate_ids(&document)?,
            heading_order(&document)?,
        ];

        Ok(violations
            .into_iter()
            .flatten()
            .map(|violation| violation.into_issue(url))
            .collect())
    }
}

fn snippet(element: &ElementRef<'_>) -> String {
    let html = element.html();
    if html.chars().count() <= MAX_SNIPPET_CHARS {
        return html;
    }
    let cut: String = html.chars().take(MAX_SNIPPET_CHARS).collect();
    format!("{}...", cut)
}

/// Opening tag only, for elements whose content is the whole page
fn opening_tag(element: &ElementRef<'_>) -> String {
    let value = element.value();
    let attributes: String = value
        .attrs()
        .map(|(name, attr)| format!(" {}=\"{}\"", name, attr))
        .collect();
    format!("<{}{}>", value.name(), attributes)
}

fn violation(
    rule: &'static str,
    impact: Impact,
    help: &'static str,
    description: &'static str,
    nodes: Vec<String>,
) -> Option<Violation> {
    if nodes.is_empty() {
        return None;
    }
    Some(Violation {
        rule,
        impact,
        help,
        description,
        nodes: nodes.into_iter().take(MAX_EVIDENCE_NODES).collect(),
    })
}

fn html_has_lang(document: &Html) -> AnalyzerResult<Option<Violation>> {
    let root = document.root_element();
    let has_lang = root
        .value()
        .attr("lang")
        .map_or(false, |lang| !lang.trim().is_empty());
    let nodes = if has_lang { Vec::new() } else { vec![opening_tag(&root)] };

    Ok(violation(
        "html-has-lang",
        Impact::Serious,
        "<html> element must have a lang attribute",
        "Ensures every HTML document has a lang attribute",
        nodes,
    ))
}

fn form_labels(document: &Html) -> AnalyzerResult<Option<Violation>> {
    let labelled_ids: HashSet<&str> = document
        .select(&css("label[for]")?)
        .filter_map(|label| label.value().attr("for"))
        .collect();

    let controls = css("input, select, textarea")?;
    let nodes = document
        .select(&controls)
        .filter(|control| {
            let value = control.value();
            let kind = value.attr("type").unwrap_or("text").to_ascii_lowercase();
            !matches!(
                kind.as_str(),
                "hidden" | "submit" | "button" | "reset" | "image"
            )
        })
        .filter(|control| {
            let value = control.value();
            let named = ["aria-label", "aria-labelledby", "title"]
                .iter()
                .any(|attribute| value.attr(attribute).map_or(false, |v| !v.trim().is_empty()));
            let by_for = value.id().map_or(false, |id| labelled_ids.contains(id));
            let wrapped = control
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| ancestor.value().name() == "label");
            !(named || by_for || wrapped)
        })
        .map(|control| snippet(&control))
        .collect();

    Ok(violation(
        "label",
        Impact::Critical,
        "Form elements must have labels",
        "Ensures every form element has a label",
        nodes,
    ))
}

fn duplicate_ids(document: &Html) -> AnalyzerResult<Option<Violation>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for element in document.select(&css("[id]")?) {
        if let Some(id) = element.value().id().filter(|id| !id.is_empty()) {
            let count = counts.entry(id).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(element);
            }
        }
    }

    Ok(violation(
        "duplicate-id",
        Impact::Minor,
        "id attribute value must be unique",
        "Ensures every id attribute value is unique",
        order.iter().map(snippet).collect(),
    ))
}

fn heading_order(document: &Html) -> AnalyzerResult<Option<Violation>> {
    let mut previous: Option<u8> = None;
    let mut nodes = Vec::new();

    for heading in document.select(&css("h1, h2, h3, h4, h5, h6")?) {
        let level = heading.value().name()[1..].parse::<u8>().unwrap_or(1);
        if let Some(prev) = previous {
            if level > prev + 1 {
                nodes.push(snippet(&heading));
            }
        }
        previous = Some(level);
    }

    Ok(violation(
        "heading-order",
        Impact::Moderate,
        "Heading levels should only increase by one",
        "Ensures the order of headings is semantically correct",
        nodes,
    ))
}

#[async_trait]
impl Analyzer for AccessibilityAnalyzer {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        Self::inspect(loaded_html(page)?, url)
    }
}
