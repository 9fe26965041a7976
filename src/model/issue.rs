//! Issue and per-page result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category an issue is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Functional,
    #[serde(rename = "UI/UX")]
    UiUx,
    Performance,
    Network,
    Content,
    Trust,
    Semantic,
    Accessibility,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 8] = [
        Category::Functional,
        Category::UiUx,
        Category::Performance,
        Category::Network,
        Category::Content,
        Category::Trust,
        Category::Semantic,
        Category::Accessibility,
    ];

    /// Returns the display label used in reports and JSON
    pub fn label(&self) -> &'static str {
        match self {
            Self::Functional => "Functional",
            Self::UiUx => "UI/UX",
            Self::Performance => "Performance",
            Self::Network => "Network",
            Self::Content => "Content",
            Self::Trust => "Trust",
            Self::Semantic => "Semantic",
            Self::Accessibility => "Accessibility",
        }
    }

    /// Parses a label case-insensitively
    ///
    /// Accepts the display label as well as the bare variant name, so both
    /// `"UI/UX"` and `"uiux"` resolve to `Category::UiUx`.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_ascii_lowercase().replace(['/', ' ', '-', '_'], "");
        Self::ALL.into_iter().find(|category| {
            category.label().to_ascii_lowercase().replace('/', "") == wanted
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Points deducted from the issue's score bucket
    pub fn deduction(&self) -> u32 {
        match self {
            Self::High => 15,
            Self::Medium => 5,
            Self::Low => 1,
        }
    }

    /// Parses a severity label case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("High"),
            Self::Medium => f.write_str("Medium"),
            Self::Low => f.write_str("Low"),
        }
    }
}

/// A single detected defect
///
/// Two issues are duplicates when they share `(description, url)`; see
/// [`Issue::dedup_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub url: String,
    pub description: String,
    pub user_impact: String,
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Issue {
    /// Creates an issue with a fresh random id and no evidence, location, or snippet
    pub fn new(
        category: Category,
        severity: Severity,
        url: impl Into<String>,
        description: impl Into<String>,
        user_impact: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category,
            severity,
            url: url.into(),
            description: description.into(),
            user_impact: user_impact.into(),
            remediation: remediation.into(),
            evidence: None,
            location: None,
            snippet: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Identity used for deduplication
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.description, &self.url)
    }
}

/// Timing measurements for one page load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfMetrics {
    /// Time to first byte of the document response (milliseconds)
    pub ttfb_ms: u64,
    /// Time until the document body was fully received (milliseconds)
    pub load_ms: u64,
}

/// Outcome of crawling a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub url: String,
    pub scanned_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    /// Outbound anchor hrefs, as discovered on the page
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_metrics: Option<PerfMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_with_display_label() {
        let json = serde_json::to_string(&Category::UiUx).unwrap();
        assert_eq!(json, "\"UI/UX\"");

        let parsed: Category = serde_json::from_str("\"UI/UX\"").unwrap();
        assert_eq!(parsed, Category::UiUx);
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(Category::from_label("trust"), Some(Category::Trust));
        assert_eq!(Category::from_label("UI/UX"), Some(Category::UiUx));
        assert_eq!(Category::from_label("ui-ux"), Some(Category::UiUx));
        assert_eq!(Category::from_label(" Semantic "), Some(Category::Semantic));
        assert_eq!(Category::from_label("Spelling"), None);
    }

    #[test]
    fn test_severity_deductions() {
        assert_eq!(Severity::High.deduction(), 15);
        assert_eq!(Severity::Medium.deduction(), 5);
        assert_eq!(Severity::Low.deduction(), 1);
    }

    #[test]
    fn test_severity_from_label() {
        assert_eq!(Severity::from_label("HIGH"), Some(Severity::High));
        assert_eq!(Severity::from_label("medium"), Some(Severity::Medium));
        assert_eq!(Severity::from_label("critical"), None);
    }

    #[test]
    fn test_issue_json_shape() {
        let issue = Issue::new(
            Category::Content,
            Severity::Medium,
            "https://example.com",
            "Missing Meta Description",
            "Search engines and social shares will look broken.",
            "Add a <meta name=\"description\"> tag.",
        )
        .with_snippet("quote");

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["userImpact"], "Search engines and social shares will look broken.");
        assert_eq!(value["snippet"], "quote");
        assert!(value.get("evidence").is_none());
        assert!(value.get("location").is_none());
    }

    #[test]
    fn test_issue_ids_are_unique() {
        let a = Issue::new(Category::Content, Severity::Low, "u", "d", "i", "r");
        let b = Issue::new(Category::Content, Severity::Low, "u", "d", "i", "r");
        assert_ne!(a.id, b.id);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
