//! Session-lifetime network observations turned into global issues

use crate::crawler::SessionEvent;
use crate::model::{Category, Issue, Severity};

/// Time to first byte above which a response is reported as slow (milliseconds)
pub const SLOW_TTFB_MS: u64 = 1_000;

/// Time to first byte above which a slow response is High severity (milliseconds)
pub const SLOW_TTFB_HIGH_MS: u64 = 3_000;

/// Converts recorded session events into issues, in event order
///
/// - HTTP status >= 400: Functional, High at >= 500, else Medium
/// - TTFB above `SLOW_TTFB_MS`: Performance, High above `SLOW_TTFB_HIGH_MS`
/// - console errors: Functional, Medium
pub fn network_issues(events: &[SessionEvent]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for event in events {
        match event {
            SessionEvent::Response {
                url,
                status,
                ttfb_ms,
                ..
            } => {
                if *status >= 400 {
                    issues.push(Issue::new(
                        Category::Functional,
                        if *status >= 500 {
                            Severity::High
                        } else {
                            Severity::Medium
                        },
                        url.as_str(),
                        format!("HTTP Error {} for resource", status),
                        "Content failed to load, potentially leaving broken UI or functionality.",
                        "Check server logs or file paths.",
                    ));
                }

                if *ttfb_ms > SLOW_TTFB_MS {
                    issues.push(Issue::new(
                        Category::Performance,
                        if *ttfb_ms > SLOW_TTFB_HIGH_MS {
                            Severity::High
                        } else {
                            Severity::Medium
                        },
                        url.as_str(),
                        format!("Slow Server Response (TTFB: {}ms)", ttfb_ms),
                        "User has to wait a long time before seeing any content.",
                        "Optimize server-side processing or database queries.",
                    ));
                }
            }
            SessionEvent::ConsoleError { page_url, message } => {
                issues.push(Issue::new(
                    Category::Functional,
                    Severity::Medium,
                    page_url.as_str(),
                    format!("JavaScript Error: {}", message),
                    "Features may not work as expected.",
                    "Fix the JavaScript exception thrown in the console.",
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ResourceKind;

    fn response(url: &str, status: u16, ttfb_ms: u64) -> SessionEvent {
        SessionEvent::Response {
            url: url.to_string(),
            page_url: "https://example.com/".to_string(),
            status,
            ttfb_ms,
            kind: ResourceKind::Script,
        }
    }

    #[test]
    fn test_healthy_responses_produce_nothing() {
        assert!(network_issues(&[response("https://example.com/a.js", 200, 120)]).is_empty());
        assert!(network_issues(&[response("https://example.com/b.js", 304, 1_000)]).is_empty());
    }

    #[test]
    fn test_status_errors() {
        let issues = network_issues(&[
            response("https://example.com/missing.css", 404, 50),
            response("https://example.com/api", 503, 50),
        ]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].description, "HTTP Error 404 for resource");
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].url, "https://example.com/missing.css");
        assert_eq!(issues[1].severity, Severity::High);
        assert!(issues.iter().all(|i| i.category == Category::Functional));
    }

    #[test]
    fn test_slow_responses() {
        let issues = network_issues(&[
            response("https://example.com/", 200, 1_500),
            response("https://example.com/slow", 500, 3_200),
        ]);
        let descriptions: Vec<_> = issues.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Slow Server Response (TTFB: 1500ms)",
                "HTTP Error 500 for resource",
                "Slow Server Response (TTFB: 3200ms)",
            ]
        );
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[2].severity, Severity::High);
        assert_eq!(issues[2].category, Category::Performance);
    }

    #[test]
    fn test_console_errors() {
        let issues = network_issues(&[SessionEvent::ConsoleError {
            page_url: "https://example.com/".to_string(),
            message: "Uncaught TypeError: x is undefined".to_string(),
        }]);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].description,
            "JavaScript Error: Uncaught TypeError: x is undefined"
        );
    }
}
