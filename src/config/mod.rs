//! Configuration module for Sitegraph
//!
//! A [`Config`] is the validated, immutable parameter set for a single crawl
//! run. It is built from a raw `toml::Table` (as found in a config file or
//! assembled by the CLI); an absent or empty table yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use sitegraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawl_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DEFAULT_CRAWL_DEPTH, DEFAULT_PAGE_NUMBER_LIMIT, DEFAULT_REQUEST_DELAY_MS,
    MAX_REQUEST_DELAY_MS,
};

// Re-export parser functions
pub use parser::{load_config, load_raw_config, parse_config};
