//! State module for tracking crawl progress
//!
//! This module provides the per-run state owned by the crawl engine.
//!
//! # Components
//!
//! - `CrawlStatus`: lifecycle of a run (idle, running, and its terminal states)
//! - `CrawlState`: visited set, fetched bodies, crawled URL order and page count
//! - `HostState`: per-host request timing used for pacing the worker pool

mod crawl_state;
mod host_state;
mod run_status;

// Re-export main types
pub use crawl_state::CrawlState;
pub use host_state::HostState;
pub use run_status::CrawlStatus;
