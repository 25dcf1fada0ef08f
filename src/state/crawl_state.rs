use std::collections::{HashMap, HashSet};

/// Mutable state of one crawl run
///
/// Owned exclusively by the engine driving the run. All counters only grow.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// URLs for which a fetch has been dispatched (per the failure policy)
    visited: HashSet<String>,

    /// Bodies of successfully fetched pages, keyed by URL
    results: HashMap<String, String>,

    /// Successfully crawled URLs in discovery order
    crawled: Vec<String>,

    /// Number of pages successfully processed
    page_count: usize,

    /// Number of dispatched fetches that failed
    failed_count: usize,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL is in the visited set
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Adds a URL to the visited set; returns false if it was already there
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string())
    }

    /// Number of distinct URLs in the visited set
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Records a successfully fetched page and advances the page count
    pub fn record_success(&mut self, url: &str, body: String) {
        if self.results.insert(url.to_string(), body).is_none() {
            self.crawled.push(url.to_string());
        }
        self.page_count += 1;
    }

    /// Records a dispatched fetch that did not succeed
    pub fn record_failure(&mut self) {
        self.failed_count += 1;
    }

    /// Number of pages successfully processed
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of failed fetches
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// Bodies of successfully fetched pages, keyed by URL
    pub fn results(&self) -> &HashMap<String, String> {
        &self.results
    }

    /// Successfully crawled URLs in discovery order
    pub fn crawled_urls(&self) -> &[String] {
        &self.crawled
    }
}
