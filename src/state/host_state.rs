use std::time::Duration;
use tokio::time::Instant;

/// Tracks request timing for one host
///
/// The worker pool keeps one of these per host key so that the pacing delay
/// is enforced per host rather than globally.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests dispatched to this host in the current run
    pub request_count: u32,

    /// When the latest request to this host is allowed to start
    pub last_request_time: Option<Instant>,
}

impl HostState {
    /// Creates a new HostState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be made to this host at `now`
    pub fn can_request(&self, delay: Duration, now: Instant) -> bool {
        self.time_until_next_request(delay, now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + delay;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Records a request scheduled to start at `at`
    pub fn record_request(&mut self, at: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(at);
    }

    /// Reserves the next request slot for this host
    ///
    /// The first request may start immediately; every later one starts no
    /// sooner than `delay` after the previous reservation. Returns the
    /// instant the reserved request may start.
    pub fn reserve(&mut self, delay: Duration, now: Instant) -> Instant {
        let start = match self.last_request_time {
            Some(_) => now + self.time_until_next_request(delay, now).unwrap_or_default(),
            None => now,
        };
        self.record_request(start);
        start
    }
}
