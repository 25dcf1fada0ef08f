use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Identity of a crawled resource
///
/// Two vertices are equal only when both the URL and the identifier match,
/// so the same URL under different identifiers yields distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    /// The absolute URL of the resource
    pub url: String,

    /// Disambiguating identifier (the last path segment by default)
    pub identifier: String,
}

impl Vertex {
    /// Creates a vertex from its two parts
    pub fn new(url: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            identifier: identifier.into(),
        }
    }

    /// Creates the vertex for a resolved URL
    ///
    /// The identifier is the last non-empty path segment, or `/` when the
    /// URL points at the site root.
    ///
    /// ```
    /// use sitegraph::Vertex;
    /// use url::Url;
    ///
    /// let v = Vertex::for_url(&Url::parse("https://x/docs/intro").unwrap());
    /// assert_eq!(v.identifier, "intro");
    /// ```
    pub fn for_url(url: &Url) -> Self {
        let identifier = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .unwrap_or_else(|| "/".to_string());

        Self {
            url: url.to_string(),
            identifier,
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
