use serde::Serialize;
use std::time::Duration;

/// Default upper bound on the number of vertices visited
pub const DEFAULT_CRAWL_DEPTH: usize = 10;

/// Default upper bound on the number of pages successfully processed
pub const DEFAULT_PAGE_NUMBER_LIMIT: usize = 20;

/// Default pause before each follow-up fetch (milliseconds)
pub const DEFAULT_REQUEST_DELAY_MS: f64 = 2000.0;

/// Largest accepted pacing delay (one day, in milliseconds)
pub const MAX_REQUEST_DELAY_MS: f64 = 86_400_000.0;

pub(crate) const DEFAULT_WORKERS: usize = 1;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Parameter set controlling a single crawl run
///
/// Field names on the wire follow the external key names (`TargetURL`,
/// `CrawlDepth`, ...). Construct one with [`Config::from_raw`],
/// [`crate::config::parse_config`] or [`Config::default`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Seed URL the crawl starts from
    #[serde(rename = "TargetURL")]
    pub target_url: String,

    /// Upper bound on the total number of vertices visited (not path length)
    #[serde(rename = "CrawlDepth")]
    pub crawl_depth: usize,

    /// Upper bound on the number of pages successfully processed
    #[serde(rename = "PageNumberLimit")]
    pub page_number_limit: usize,

    /// User agent sent with every fetch
    #[serde(rename = "UserAgent")]
    pub user_agent: String,

    /// Pause before each follow-up fetch (milliseconds)
    #[serde(rename = "RequestDelay")]
    pub request_delay_ms: f64,

    /// Number of concurrent fetch workers; 1 keeps the sequential traversal
    #[serde(rename = "Workers")]
    pub workers: usize,

    /// Per-fetch timeout used by the HTTP fetcher (milliseconds)
    #[serde(rename = "RequestTimeout")]
    pub request_timeout_ms: u64,
}

impl Config {
    /// The pacing delay as a `Duration`
    ///
    /// Values outside `0..=MAX_REQUEST_DELAY_MS` (possible only when the
    /// struct is built by hand) are clamped into that range.
    pub fn request_delay(&self) -> Duration {
        let ms = self.request_delay_ms.min(MAX_REQUEST_DELAY_MS).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }

    /// The per-fetch timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns true when the run uses the sequential depth-first traversal
    pub fn is_sequential(&self) -> bool {
        self.workers <= 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            crawl_depth: DEFAULT_CRAWL_DEPTH,
            page_number_limit: DEFAULT_PAGE_NUMBER_LIMIT,
            user_agent: String::new(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            workers: DEFAULT_WORKERS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}
