//! Language-model review of page text for trust and professionalism issues

use super::{loaded_html, Analyzer, AnalyzerResult};
use crate::config::LlmConfig;
use crate::crawler::parser::{extract_page_text, locate_quote};
use crate::crawler::PageHandle;
use crate::llm::LanguageModel;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Evaluation prompt sent ahead of the page text
pub const SEMANTIC_PROMPT: &str = r#"You are an expert website quality and trust auditor. Analyze the following website text content for issues related to:
1. Trust & Legitimacy (scams, misleading claims, dark patterns)
2. Professionalism (grammar, spelling, inconsistent tone)
3. User Experience from a content perspective (confusing language, lack of clarity)

Return a JSON object with a list of specific "issues".
Each issue must have:
- "category": one of ["Trust", "Content", "Semantic"]
- "severity": "High", "Medium", or "Low"
- "description": A concise description of the issue.
- "remediation": Advice on how to fix it.
- "userImpact": How this affects the user.
- "exactQuote": The EXACT text substring from the page that triggers this issue. If it is a general issue, use null.

If the website seems mostly fine, return an empty list.

Example Output Format:
{
    "issues": [
        {
            "category": "Trust",
            "severity": "High",
            "description": "Detected 'Urgency' dark pattern",
            "remediation": "Remove artificial countdown timers.",
            "userImpact": "Creates false anxiety and pressure.",
            "exactQuote": "Only 2 minutes left to buy!"
        }
    ]
}

Do not include markdown formatting. Return raw JSON."#;

const AI_EVIDENCE: &str = "AI Analysis";
const DEFAULT_LOCATION: &str = "Page Body";

/// One issue as returned by the model
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiIssue {
    pub category: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub remediation: Option<String>,
    pub user_impact: Option<String>,
    pub exact_quote: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiEnvelope {
    issues: Vec<AiIssue>,
}

/// Parses a model response into its issue list
///
/// Markdown code fences around the JSON are removed first. Returns None when
/// the response is not a JSON object with an `issues` array.
pub fn parse_ai_response(raw: &str) -> Option<Vec<AiIssue>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    serde_json::from_str::<AiEnvelope>(cleaned.trim())
        .ok()
        .map(|envelope| envelope.issues)
}

/// Sends page text to a language model and converts its findings to issues
pub struct SemanticAnalyzer {
    model: Option<Arc<dyn LanguageModel>>,
    max_chars: usize,
    min_chars: usize,
}

impl SemanticAnalyzer {
    /// Creates the analyzer; without a model it reports nothing
    pub fn new(model: Option<Arc<dyn LanguageModel>>, config: &LlmConfig) -> Self {
        Self {
            model,
            max_chars: config.max_chars,
            min_chars: config.min_chars,
        }
    }

    fn to_issue(ai: AiIssue, html: &str, url: &str) -> Option<Issue> {
        let description = ai.description.filter(|d| !d.trim().is_empty())?;

        let category = ai
            .category
            .as_deref()
            .and_then(Category::from_label)
            .unwrap_or(Category::Semantic);
        let severity = ai
            .severity
            .as_deref()
            .and_then(Severity::from_label)
            .unwrap_or(Severity::Medium);

        let quote = ai.exact_quote.filter(|q| !q.trim().is_empty());
        let location = quote
            .as_deref()
            .and_then(|q| locate_quote(html, q))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let mut issue = Issue::new(
            category,
            severity,
            url,
            description,
            ai.user_impact.unwrap_or_default(),
            ai.remediation.unwrap_or_default(),
        )
        .with_evidence(AI_EVIDENCE)
        .with_location(location);
        if let Some(quote) = quote {
            issue = issue.with_snippet(quote);
        }
        Some(issue)
    }
}

#[async_trait]
impl Analyzer for SemanticAnalyzer {
    fn name(&self) -> &'static str {
        "semantic"
    }

    async fn analyze(&self, page: &PageHandle, url: &str) -> AnalyzerResult<Vec<Issue>> {
        let Some(model) = &self.model else {
            return Ok(Vec::new());
        };

        let html = loaded_html(page)?;
        let text = extract_page_text(html, self.max_chars);
        if text.chars().count() < self.min_chars {
            tracing::debug!("Skipping AI analysis of {}: too little text", url);
            return Ok(Vec::new());
        }

        let response = match model.generate(SEMANTIC_PROMPT, &text).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("AI analysis of {} failed: {}", url, e);
                return Ok(Vec::new());
            }
        };

        let Some(found) = parse_ai_response(&response) else {
            tracing::warn!("Failed to parse AI response for {}", url);
            tracing::debug!("Raw AI response: {}", response);
            return Ok(Vec::new());
        };

        Ok(found
            .into_iter()
            .filter_map(|ai| Self::to_issue(ai, html, url))
            .collect())
    }
}
