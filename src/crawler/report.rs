//! Summary of a finished crawl run

use crate::state::CrawlStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters and timestamps describing one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlReport {
    /// Terminal status of the run
    pub status: CrawlStatus,

    /// Successful fetches (the page count)
    pub pages_processed: usize,

    /// Size of the visited set when the run ended
    pub visited: usize,

    /// Number of vertices in the site graph
    pub vertices: usize,

    /// Number of edges in the site graph
    pub edges: usize,

    /// Fetches that failed with a transport error or non-2xx status
    pub failed_fetches: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Pages per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.duration().num_milliseconds() as f64 / 1000.0;
        if secs > 0.0 {
            self.pages_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Status: {}", report.status);
    println!(
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Duration: {:.2}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    println!("Pages:");
    println!("  Processed: {}", report.pages_processed);
    println!("  Visited: {}", report.visited);
    println!("  Failed fetches: {}", report.failed_fetches);
    println!("  Rate: {:.2} pages/sec", report.rate());
    println!();

    println!("Graph:");
    println!("  Vertices: {}", report.vertices);
    println!("  Edges: {}", report.edges);
}
