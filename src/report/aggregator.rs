use crate::model::{Issue, PageResult};
use std::collections::HashSet;

/// Merges global and per-page issues, dropping duplicates
///
/// Global issues come first, then each page's issues in result order. Issues
/// sharing `(description, url)` collapse to the first one seen.
pub fn merge(global_issues: Vec<Issue>, results: &[PageResult]) -> Vec<Issue> {
    let mut seen: HashSet<(String, String)> = HashSet::new();

    global_issues
        .into_iter()
        .chain(results.iter().flat_map(|result| result.issues.iter().cloned()))
        .filter(|issue| {
            let (description, url) = issue.dedup_key();
            seen.insert((description.to_owned(), url.to_owned()))
        })
        .collect()
}
