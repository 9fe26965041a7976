//! Scoring and report types

use crate::model::issue::{Category, Issue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Score bucket an issue category deducts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Functionality,
    Performance,
    UiUx,
    Reliability,
    Content,
    Semantic,
    Accessibility,
}

impl Bucket {
    /// Every bucket, in report order
    pub const ALL: [Bucket; 7] = [
        Bucket::Functionality,
        Bucket::Performance,
        Bucket::UiUx,
        Bucket::Reliability,
        Bucket::Content,
        Bucket::Semantic,
        Bucket::Accessibility,
    ];

    /// Starting (maximum) points for this bucket; all weights sum to 100
    pub fn weight(&self) -> u32 {
        match self {
            Self::Functionality => 15,
            Self::Performance => 10,
            Self::UiUx => 10,
            Self::Reliability => 10,
            Self::Content => 10,
            Self::Semantic => 25,
            Self::Accessibility => 20,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Functionality => "Functionality",
            Self::Performance => "Performance",
            Self::UiUx => "UI/UX",
            Self::Reliability => "Reliability",
            Self::Content => "Content",
            Self::Semantic => "Semantic",
            Self::Accessibility => "Accessibility",
        }
    }

    /// Sum of every bucket weight
    pub fn total_weight() -> u32 {
        Self::ALL.iter().map(Bucket::weight).sum()
    }
}

impl From<Category> for Bucket {
    fn from(category: Category) -> Self {
        match category {
            Category::Functional => Bucket::Functionality,
            Category::Performance => Bucket::Performance,
            Category::UiUx => Bucket::UiUx,
            Category::Network => Bucket::Reliability,
            Category::Content => Bucket::Content,
            Category::Semantic | Category::Trust => Bucket::Semantic,
            Category::Accessibility => Bucket::Accessibility,
        }
    }
}

/// Per-bucket points remaining after deductions
///
/// Each field starts at its bucket's weight and only ever decreases, never
/// below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub functionality: u32,
    pub performance: u32,
    pub ui_ux: u32,
    pub reliability: u32,
    pub content: u32,
    pub semantic: u32,
    pub accessibility: u32,
}

impl ScoreBreakdown {
    /// A breakdown with every bucket at full weight
    pub fn full() -> Self {
        Self {
            functionality: Bucket::Functionality.weight(),
            performance: Bucket::Performance.weight(),
            ui_ux: Bucket::UiUx.weight(),
            reliability: Bucket::Reliability.weight(),
            content: Bucket::Content.weight(),
            semantic: Bucket::Semantic.weight(),
            accessibility: Bucket::Accessibility.weight(),
        }
    }

    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Functionality => self.functionality,
            Bucket::Performance => self.performance,
            Bucket::UiUx => self.ui_ux,
            Bucket::Reliability => self.reliability,
            Bucket::Content => self.content,
            Bucket::Semantic => self.semantic,
            Bucket::Accessibility => self.accessibility,
        }
    }

    fn slot(&mut self, bucket: Bucket) -> &mut u32 {
        match bucket {
            Bucket::Functionality => &mut self.functionality,
            Bucket::Performance => &mut self.performance,
            Bucket::UiUx => &mut self.ui_ux,
            Bucket::Reliability => &mut self.reliability,
            Bucket::Content => &mut self.content,
            Bucket::Semantic => &mut self.semantic,
            Bucket::Accessibility => &mut self.accessibility,
        }
    }

    /// Subtracts `points` from a bucket, flooring at zero
    pub fn deduct(&mut self, bucket: Bucket, points: u32) {
        let slot = self.slot(bucket);
        *slot = slot.saturating_sub(points);
    }

    /// Sum of all buckets
    pub fn total(&self) -> u32 {
        Bucket::ALL.iter().map(|bucket| self.get(*bucket)).sum()
    }
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self::full()
    }
}

/// Weighted hygiene score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HygieneScore {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
}

/// Three-level trust label derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustSummary {
    #[serde(rename = "High Trust")]
    High,
    #[serde(rename = "Moderate Trust")]
    Moderate,
    #[serde(rename = "Low Trust")]
    Low,
}

impl TrustSummary {
    /// `> 80` is High, `> 50` is Moderate, anything else is Low
    pub fn from_total(total: u32) -> Self {
        if total > 80 {
            Self::High
        } else if total > 50 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Trust",
            Self::Moderate => "Moderate Trust",
            Self::Low => "Low Trust",
        }
    }
}

impl fmt::Display for TrustSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of knowledge-graph node; the graph currently holds pages only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Page,
}

/// One node of the page-link knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// The page URL
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// The page path
    pub label: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Outbound link ids
    #[serde(default)]
    pub edges: Vec<String>,
}

/// Remediation text bucketed by urgency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

/// The complete scan report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub score: HygieneScore,
    pub trust_summary: TrustSummary,
    pub pages_scanned: usize,
    pub issues: Vec<Issue>,
    pub critical_issues: Vec<Issue>,
    pub knowledge_graph: Vec<GraphNode>,
    pub recommendations: Recommendations,
    pub closing_insight: String,
}
