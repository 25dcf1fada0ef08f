use crate::url::host_key;
use std::fmt::Debug;
use url::Url;

/// Decides whether a raw `href` should be dropped before resolution
///
/// Policies run after fragment-only and empty links have already been
/// excluded, and before the link is resolved against its page.
pub trait ExclusionPolicy: Debug + Send + Sync {
    /// Short name used in logs and on the command line
    fn name(&self) -> &'static str;

    /// Returns true if the link must not be followed
    fn excludes(&self, base: &Url, href: &str) -> bool;
}

/// Excludes any link with a `:` inside one of its `/`-separated segments
///
/// This keeps the crawl on the seed's site by dropping every link that
/// carries an explicit scheme (`mailto:`, `javascript:`, `https://other/`).
/// It is coarse: relative paths such as `/a:b` are dropped too.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColonSegmentPolicy;

impl ExclusionPolicy for ColonSegmentPolicy {
    fn name(&self) -> &'static str {
        "colon-segment"
    }

    fn excludes(&self, _base: &Url, href: &str) -> bool {
        href.split('/').any(|segment| segment.contains(':'))
    }
}

/// Excludes links that leave the base page's host or use a non-HTTP scheme
///
/// Unlike [`ColonSegmentPolicy`] this follows absolute links back into the
/// same site and keeps relative paths containing `:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameHostPolicy;

impl ExclusionPolicy for SameHostPolicy {
    fn name(&self) -> &'static str {
        "same-host"
    }

    fn excludes(&self, base: &Url, href: &str) -> bool {
        // Unresolvable links are left to the resolver to report
        let Ok(target) = base.join(href) else {
            return false;
        };

        if target.scheme() != "http" && target.scheme() != "https" {
            return true;
        }

        host_key(&target) != host_key(base)
    }
}
