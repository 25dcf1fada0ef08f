//! Crawler module for traversal and page fetching
//!
//! This module contains the core crawling logic, including:
//! - The fetch and link-extraction capabilities the engine consumes
//! - HTTP fetching with `reqwest`
//! - HTML link extraction with `scraper`
//! - Frontier management and per-host pacing for the worker pool
//! - The crawl engine and its run report

mod engine;
mod fetcher;
mod parser;
mod report;
mod scheduler;
mod traits;

pub use engine::{CrawlEngine, FailurePolicy};
pub use fetcher::{build_http_client, HttpFetcher};
pub use parser::{parse_html, HtmlLinkExtractor, ParsedPage};
pub use report::{print_report, CrawlReport};
pub use scheduler::{QueuedUrl, Scheduler};
pub use traits::{FetchResponse, Fetcher, LinkExtractor};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the HTTP client from the configured timeout
/// 2. Fetch the seed and follow links within the configured limits
/// 3. Return the engine, whose results and graph stay readable
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok((engine, report))` - Crawl finished (completed, limit reached or cancelled)
/// * `Err(SitegraphError)` - Seed invalid or unreachable, or client setup failed
pub async fn crawl(
    config: Config,
) -> Result<(CrawlEngine<HttpFetcher, HtmlLinkExtractor>, CrawlReport)> {
    let mut engine = CrawlEngine::http(config)?;
    let report = engine.start().await?;
    Ok((engine, report))
}
