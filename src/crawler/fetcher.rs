//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured timeout
//! - Sending a GET per vertex with the configured user agent
//! - Classifying transport failures into [`TransportError`]
//!
//! Redirects are followed by the client. A non-2xx response is returned as
//! is and judged by the engine.

use crate::crawler::{FetchResponse, Fetcher};
use crate::TransportError;
use reqwest::{header::USER_AGENT, Client};
use std::time::Duration;

/// Connection setup is capped separately from the overall request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Overall per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitegraph::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(timeout)?))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchResponse, TransportError> {
        let mut request = self.client.get(url);
        // An empty agent means "send none"
        if !user_agent.is_empty() {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;
        let status = response.status();

        match response.text().await {
            Ok(body) => Ok(FetchResponse::new(status.as_u16(), body)),
            // The body of an error page is never parsed, so losing it is harmless
            Err(_) if !status.is_success() => Ok(FetchResponse::new(status.as_u16(), "")),
            Err(e) => Err(TransportError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Maps a request error onto a transport failure
fn classify(url: &str, e: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if e.is_timeout() {
        TransportError::Timeout { url }
    } else if e.is_connect() {
        TransportError::Connect { url }
    } else {
        TransportError::Other {
            url,
            message: e.to_string(),
        }
    }
}
