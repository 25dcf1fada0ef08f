//! Capabilities the crawl engine consumes
//!
//! The engine never talks to the network or parses HTML itself. It is handed
//! a [`Fetcher`] and a [`LinkExtractor`]; the crate ships [`HttpFetcher`] and
//! [`HtmlLinkExtractor`], and tests substitute in-memory versions.
//!
//! [`HttpFetcher`]: crate::crawler::HttpFetcher
//! [`HtmlLinkExtractor`]: crate::crawler::HtmlLinkExtractor

use crate::TransportError;
use std::future::Future;

/// Status and body of a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

impl FetchResponse {
    /// Creates a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches a URL on behalf of the engine
///
/// A non-2xx response is still `Ok`; `Err` is reserved for transport
/// failures where no response was received.
pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send;
}

/// Extracts raw outbound `href` values from a page body
///
/// Links are returned in document order and unresolved; the engine resolves
/// and filters them.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str) -> Vec<String>;
}

impl<T> LinkExtractor for T
where
    T: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn extract_links(&self, body: &str) -> Vec<String> {
        self(body)
    }
}
