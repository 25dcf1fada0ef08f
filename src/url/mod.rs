//! URL handling module for Sitegraph
//!
//! This module provides link resolution (turning a raw `href` found on a page
//! into an absolute URL, or excluding it), the exclusion policies the resolver
//! applies, and host keys used for per-host pacing.

mod domain;
mod policy;
mod resolve;

// Re-export main functions
pub use domain::host_key;
pub use policy::{ColonSegmentPolicy, ExclusionPolicy, SameHostPolicy};
pub use resolve::{resolve, LinkResolver};
