//! Frontier and per-host pacing for the worker pool
//!
//! The pool crawls breadth-first: links are queued in discovery order and
//! dispatched first-in first-out. Each dispatch reserves a start slot on its
//! host so that requests to one host are spaced by the configured delay,
//! while requests to different hosts may overlap.

use crate::graph::Vertex;
use crate::state::HostState;
use crate::url::host_key;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Host key used for pacing
    pub host: String,

    /// Vertex whose page linked here; `None` for the seed
    pub parent: Option<Vertex>,
}

impl QueuedUrl {
    /// Creates a queued URL, deriving its host key
    pub fn new(url: Url, parent: Option<Vertex>) -> Self {
        let host = host_key(&url).unwrap_or_default();
        Self { url, host, parent }
    }

    /// Returns true if this is the seed of the run
    pub fn is_seed(&self) -> bool {
        self.parent.is_none()
    }
}

/// Scheduler manages the frontier queue and per-host pacing
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Per-host timing state
    host_states: HashMap<String, HostState>,

    /// URLs to fetch, in discovery order
    frontier: VecDeque<QueuedUrl>,
}

impl Scheduler {
    /// Creates an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL to the back of the frontier
    pub fn add_to_frontier(&mut self, url: QueuedUrl) {
        self.frontier.push_back(url);
    }

    /// Takes the oldest URL from the frontier
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        self.frontier.pop_front()
    }

    /// Reserves the next request slot on `host`
    ///
    /// # Arguments
    ///
    /// * `host` - Host key of the URL about to be dispatched
    /// * `delay` - Minimum spacing between requests to one host
    ///
    /// # Returns
    ///
    /// The instant at which the request may start
    pub fn reserve_slot(&mut self, host: &str, delay: Duration) -> Instant {
        let now = Instant::now();
        let state = self
            .host_states
            .entry(host.to_string())
            .or_insert_with(HostState::new);

        let start = state.reserve(delay, now);
        tracing::trace!(
            "Reserved slot for host {} in {:?} ({} requests)",
            host,
            start.saturating_duration_since(now),
            state.request_count
        );
        start
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Gets the pacing state for a specific host
    pub fn get_host_state(&self, host: &str) -> Option<&HostState> {
        self.host_states.get(host)
    }
}
