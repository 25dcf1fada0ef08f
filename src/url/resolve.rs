use crate::url::{ColonSegmentPolicy, ExclusionPolicy};
use crate::{UrlError, UrlResult};
use url::Url;

/// Turns raw `href` values into absolute URLs
///
/// Exclusion rules, applied in order:
///
/// 1. empty (after trimming) or fragment-only (`#...`) links are excluded
/// 2. links rejected by the configured [`ExclusionPolicy`] are excluded
///    ([`ColonSegmentPolicy`] by default)
/// 3. everything else is resolved against the page URL with standard
///    relative-reference resolution; the fragment is dropped
#[derive(Debug)]
pub struct LinkResolver {
    policy: Box<dyn ExclusionPolicy>,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkResolver {
    /// Creates a resolver with the default colon-segment policy
    pub fn new() -> Self {
        Self::with_policy(ColonSegmentPolicy)
    }

    /// Creates a resolver with a custom exclusion policy
    pub fn with_policy(policy: impl ExclusionPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    /// Name of the active exclusion policy
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Resolves `href` against an already parsed page URL
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Url))` - The absolute URL to follow
    /// * `Ok(None)` - The link is excluded
    /// * `Err(UrlError)` - The link could not be resolved
    pub fn resolve_url(&self, base: &Url, href: &str) -> UrlResult<Option<Url>> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            tracing::trace!("Excluding fragment/empty link '{}'", href);
            return Ok(None);
        }

        if self.policy.excludes(base, href) {
            tracing::trace!("Link '{}' excluded by {} policy", href, self.policy.name());
            return Ok(None);
        }

        let mut resolved = base.join(href).map_err(|e| UrlError::Parse {
            base: base.to_string(),
            href: href.to_string(),
            reason: e.to_string(),
        })?;
        resolved.set_fragment(None);

        Ok(Some(resolved))
    }

    /// Resolves `href` against a page URL given as a string
    pub fn resolve(&self, base: &str, href: &str) -> UrlResult<Option<String>> {
        let base_url = Url::parse(base).map_err(|e| UrlError::InvalidBase {
            base: base.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.resolve_url(&base_url, href)?.map(String::from))
    }
}

/// Resolves a link with the default policy
///
/// # Examples
///
/// ```
/// use sitegraph::url::resolve;
///
/// assert_eq!(resolve("https://x/", "/p1").unwrap(), Some("https://x/p1".to_string()));
/// assert_eq!(resolve("https://x/", "#top").unwrap(), None);
/// assert_eq!(resolve("https://x/", "mailto:a@b.com").unwrap(), None);
/// ```
pub fn resolve(base: &str, href: &str) -> UrlResult<Option<String>> {
    LinkResolver::new().resolve(base, href)
}
