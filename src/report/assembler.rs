use crate::model::{
    FinalReport, GraphNode, HygieneScore, Issue, NodeKind, PageResult, Recommendations, Severity,
    TrustSummary,
};
use crate::url::path_label;
use std::collections::BTreeMap;

/// Scores below this get the critical closing insight
const CRITICAL_THRESHOLD: u32 = 50;

pub const CLOSING_CRITICAL: &str = "Critical trust issues detected, immediate remediation required.";
pub const CLOSING_TRUSTWORTHY: &str = "Site is generally trustworthy.";

/// One-line summary keyed off the total score
pub fn closing_insight(total: u32) -> &'static str {
    if total < CRITICAL_THRESHOLD {
        CLOSING_CRITICAL
    } else {
        CLOSING_TRUSTWORTHY
    }
}

/// Assembles the final report
///
/// The knowledge graph has one page node per result (id = URL, label = path,
/// edges = the page's links). Remediation text is bucketed by severity.
pub fn assemble(results: &[PageResult], issues: Vec<Issue>, score: HygieneScore) -> FinalReport {
    let knowledge_graph = results
        .iter()
        .map(|result| {
            let mut properties = BTreeMap::new();
            properties.insert("issueCount".to_string(), serde_json::json!(result.issues.len()));
            if let Some(perf) = &result.perf_metrics {
                properties.insert("ttfbMs".to_string(), serde_json::json!(perf.ttfb_ms));
                properties.insert("loadMs".to_string(), serde_json::json!(perf.load_ms));
            }

            GraphNode {
                id: result.url.clone(),
                kind: NodeKind::Page,
                label: path_label(&result.url),
                properties,
                edges: result.links.clone(),
            }
        })
        .collect();

    let remediations = |severity: Severity| -> Vec<String> {
        issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .map(|issue| issue.remediation.clone())
            .collect()
    };
    let recommendations = Recommendations {
        immediate: remediations(Severity::High),
        short_term: remediations(Severity::Medium),
        long_term: remediations(Severity::Low),
    };

    let critical_issues = issues
        .iter()
        .filter(|issue| issue.severity == Severity::High)
        .cloned()
        .collect();

    FinalReport {
        trust_summary: TrustSummary::from_total(score.total),
        closing_insight: closing_insight(score.total).to_string(),
        score,
        pages_scanned: results.len(),
        issues,
        critical_issues,
        knowledge_graph,
        recommendations,
    }
}
