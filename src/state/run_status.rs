//! Run status definitions for a crawl engine
//!
//! A run moves `Idle -> Running -> {Completed, LimitReached, Cancelled, Failed}`;
//! `reset` returns any state to `Idle`.
use serde::Serialize;
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CrawlStatus {
    // ===== Active States =====
    /// Engine constructed, no traversal started yet
    Idle,

    /// Traversal in progress
    Running,

    // ===== Terminal Success States =====
    /// The frontier was exhausted before any limit was hit
    Completed,

    /// `PageNumberLimit` was reached; partial results are valid
    LimitReached,

    // ===== Terminal Stop States =====
    /// The run was stopped through its cancellation token
    Cancelled,

    /// The seed could not be fetched or resolved
    Failed,
}

impl CrawlStatus {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Running)
    }

    /// Returns true if the run finished with usable results
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::LimitReached)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        match (self, next) {
            (_, Self::Idle) => true,
            (Self::Idle, Self::Running) => true,
            (Self::Running, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Converts the status to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::LimitReached => "limit_reached",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
