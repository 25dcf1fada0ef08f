//! Sitegraph: a paced site-graph crawler
//!
//! This crate starts from a seed URL, follows discovered links, deduplicates
//! visited resources, enforces depth and page-count limits, paces requests,
//! and records the parent/child relationships between crawled pages in a
//! [`graph::SiteGraph`].

pub mod config;
pub mod crawler;
pub mod graph;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitegraph operations
#[derive(Debug, Error)]
pub enum SitegraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("Seed fetch failed for {url}: {reason}")]
    SeedFetch { url: String, reason: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlStatus,
        to: state::CrawlStatus,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Site graph consistency errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Vertex {child} was found as a child of {parent}, but does not exist in the graph")]
    Dangling {
        parent: graph::Vertex,
        child: graph::Vertex,
    },

    #[error("Vertex {0} does not exist in the graph")]
    UnknownVertex(graph::Vertex),
}

/// Link resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Invalid base URL '{base}': {reason}")]
    InvalidBase { base: String, reason: String },

    #[error("Failed to resolve '{href}' against '{base}': {reason}")]
    Parse {
        base: String,
        href: String,
        reason: String,
    },
}

/// Per-fetch transport failures
///
/// These never abort a run; the engine logs them and skips the vertex.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Other { url: String, message: String },
}

/// Result type alias for Sitegraph operations
pub type Result<T> = std::result::Result<T, SitegraphError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for link resolution
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for graph inspection
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlReport, FailurePolicy, Fetcher, LinkExtractor};
pub use graph::{SiteGraph, TreeNode, Vertex};
pub use state::{CrawlState, CrawlStatus};
pub use url::{ColonSegmentPolicy, ExclusionPolicy, LinkResolver, SameHostPolicy};
