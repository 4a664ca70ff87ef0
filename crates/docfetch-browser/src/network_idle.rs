use std::collections::HashSet;
use std::time::{Duration, Instant};

/// When a page counts as network-idle
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    /// In-flight requests tolerated while still idle
    pub max_inflight: usize,
    /// How long the in-flight count must stay at or below `max_inflight`
    pub window: Duration,
}

impl IdlePolicy {
    pub fn new(max_inflight: usize, window: Duration) -> Self {
        Self {
            max_inflight,
            window,
        }
    }
}

/// Tracks in-flight requests reported by the Network domain
///
/// Requests are keyed by CDP request id. A redirect reuses its id, so it is
/// not counted twice.
#[derive(Debug)]
pub struct InflightTracker {
    policy: IdlePolicy,
    inflight: HashSet<String>,
    quiet_since: Option<Instant>,
}

impl InflightTracker {
    /// Create a tracker with nothing in flight, quiet from `now`
    pub fn new(policy: IdlePolicy, now: Instant) -> Self {
        Self {
            policy,
            inflight: HashSet::new(),
            quiet_since: Some(now),
        }
    }

    /// Record a `Network.requestWillBeSent`
    pub fn request_started(&mut self, request_id: &str, at: Instant) {
        self.inflight.insert(request_id.to_string());
        self.update_quiet(at);
    }

    /// Record a `Network.loadingFinished` or `Network.loadingFailed`
    pub fn request_done(&mut self, request_id: &str, at: Instant) {
        self.inflight.remove(request_id);
        self.update_quiet(at);
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    /// Instant at which the page becomes idle if nothing else starts
    pub fn idle_at(&self) -> Option<Instant> {
        self.quiet_since.map(|since| since + self.policy.window)
    }

    /// Whether the in-flight count has been low for the whole window
    pub fn is_idle(&self, now: Instant) -> bool {
        self.idle_at().is_some_and(|at| now >= at)
    }

    fn update_quiet(&mut self, at: Instant) {
        if self.inflight.len() > self.policy.max_inflight {
            self.quiet_since = None;
        } else if self.quiet_since.is_none() {
            self.quiet_since = Some(at);
        }
    }
}
