//! Site graph module
//!
//! The graph is an adjacency mapping from each crawled [`Vertex`] to the
//! ordered sequence of vertices discovered on its page.
//!
//! # Components
//!
//! - `Vertex`: identity of a crawled resource, `(url, identifier)`
//! - `SiteGraph`: idempotent edge insertion, dangling-reference validation
//!   and ordered pre-order traversal
//! - `TreeNode`: nested `{url, path, children}` export/import format

mod export;
mod site_graph;
mod vertex;

// Re-export main types
pub use export::TreeNode;
pub use site_graph::{SiteGraph, Traverse};
pub use vertex::Vertex;
