//! Crawl frontier: the work queue plus the visited set
//!
//! This module handles:
//! - FIFO ordering of `(url, depth)` entries
//! - Canonicalization so trailing-slash variants are one entity
//! - Dropping entries deeper than the depth limit at push time
//! - Atomic check-and-mark reservation of visited slots under the page cap

use crate::url::canonical_url;
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// Canonical URL
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

/// Frontier governs which URLs remain to crawl
///
/// The frontier is not synchronized itself; the coordinator owns it behind a
/// mutex so that [`Frontier::try_reserve`] runs as a single critical section.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,

    /// Every canonical URL ever accepted: queued, in flight, or visited
    seen: HashSet<String>,

    visited: HashSet<String>,

    max_pages: usize,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Upper bound on distinct visited URLs
    /// * `max_depth` - Entries deeper than this are never enqueued
    pub fn new(max_pages: usize, max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            visited: HashSet::new(),
            max_pages,
            max_depth,
        }
    }

    /// Enqueues a URL at the given depth
    ///
    /// # Returns
    ///
    /// `true` if the entry was enqueued; `false` if it was dropped for
    /// exceeding the depth limit or because its canonical form was already
    /// queued or visited.
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        if depth > self.max_depth {
            tracing::trace!("Dropping {} at depth {} (max {})", url, depth, self.max_depth);
            return false;
        }

        let canonical = canonical_url(url);
        if !self.seen.insert(canonical.clone()) {
            return false;
        }

        self.queue.push_back(QueuedUrl {
            url: canonical,
            depth,
        });
        true
    }

    /// Removes up to `size` entries in FIFO order
    pub fn pop_batch(&mut self, size: usize) -> Vec<QueuedUrl> {
        let take = size.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    /// True when the page cap is reached or nothing is queued
    pub fn should_stop(&self) -> bool {
        self.cap_reached() || self.queue.is_empty()
    }

    /// True once `max_pages` distinct URLs have been visited
    pub fn cap_reached(&self) -> bool {
        self.visited.len() >= self.max_pages
    }

    /// Marks a URL visited if the cap allows and it was not visited before
    ///
    /// The cap check, the duplicate check, and the mark happen together, so
    /// two callers holding the same lock can never both win the same URL.
    pub fn try_reserve(&mut self, url: &str) -> bool {
        if self.cap_reached() {
            return false;
        }
        let canonical = canonical_url(url);
        self.seen.insert(canonical.clone());
        self.visited.insert(canonical)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_variants_are_one_entry() {
        let mut frontier = Frontier::new(10, 2);
        assert!(frontier.push("http://a.com", 0));
        assert!(!frontier.push("http://a.com/", 0));
        assert_eq!(frontier.queued_count(), 1);

        let entry = frontier.pop_batch(1).remove(0);
        assert!(frontier.try_reserve(&entry.url));
        assert!(!frontier.try_reserve("http://a.com/"));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_depth_filter_applies_at_push() {
        let mut frontier = Frontier::new(10, 1);
        assert!(frontier.push("https://a.com/one", 1));
        assert!(!frontier.push("https://a.com/two", 2));
        assert_eq!(frontier.queued_count(), 1);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(10, 3);
        frontier.push("https://a.com/1", 0);
        frontier.push("https://a.com/2", 1);
        frontier.push("https://a.com/3", 1);

        let batch = frontier.pop_batch(2);
        assert_eq!(batch[0].url, "https://a.com/1");
        assert_eq!(batch[1].url, "https://a.com/2");
        assert_eq!(frontier.pop_batch(2)[0].url, "https://a.com/3");
        assert!(frontier.pop_batch(1).is_empty());
    }

    #[test]
    fn test_page_cap_blocks_reservation() {
        let mut frontier = Frontier::new(2, 5);
        assert!(frontier.try_reserve("https://a.com/1"));
        assert!(frontier.try_reserve("https://a.com/2"));
        assert!(frontier.cap_reached());
        assert!(!frontier.try_reserve("https://a.com/3"));
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_should_stop() {
        let mut frontier = Frontier::new(1, 5);
        assert!(frontier.should_stop(), "empty frontier stops");

        frontier.push("https://a.com/", 0);
        frontier.push("https://a.com/next", 1);
        assert!(!frontier.should_stop());

        let entry = frontier.pop_batch(1).remove(0);
        frontier.try_reserve(&entry.url);
        assert!(frontier.should_stop(), "cap reached stops even with queued work");
    }

    #[test]
    fn test_visited_urls_are_not_requeued() {
        let mut frontier = Frontier::new(10, 5);
        frontier.push("https://a.com/page", 0);
        let entry = frontier.pop_batch(1).remove(0);
        frontier.try_reserve(&entry.url);

        assert!(!frontier.push("https://a.com/page/", 1));
        assert!(!frontier.try_reserve("https://a.com/page"));
        assert_eq!(frontier.visited_count(), 1);
        assert_eq!(frontier.queued_count(), 0);
    }

    #[test]
    fn test_pop_batch_larger_than_queue() {
        let mut frontier = Frontier::new(10, 5);
        frontier.push("https://a.com/x", 0);
        assert_eq!(frontier.pop_batch(5).len(), 1);
        assert!(frontier.pop_batch(5).is_empty());
    }
}
