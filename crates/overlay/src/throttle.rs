//! Re-apply throttle - coalesces mutation bursts into one overlay pass
//!
//! Keystroke-level mutations arrive far faster than a full highlight
//! re-apply is worth running; the throttle limits passes to one per
//! interval while guaranteeing a trailing pass after the last mutation in
//! a burst. The struct never samples the clock itself - callers pass
//! `Instant`s - so tests drive it deterministically.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Throttle configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum spacing between overlay passes
    pub interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
        }
    }
}

impl ThrottleConfig {
    /// Set the pass interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Coalesces rapid mutations to at most one re-apply per interval.
#[derive(Debug)]
pub struct ReapplyThrottle {
    config: ThrottleConfig,
    pending: bool,
    last_pass: Option<Instant>,
}

impl ReapplyThrottle {
    /// Create a throttle with the given config.
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            pending: false,
            last_pass: None,
        }
    }

    /// Record a committed document mutation.
    pub fn note_mutation(&mut self, _now: Instant) {
        self.pending = true;
    }

    /// Check whether a mutation is waiting for a pass.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Poll for due work. Returns `true` when the caller should run a
    /// full highlight re-apply now; the pending flag clears and the
    /// interval restarts from this pass.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        let due = self
            .last_pass
            .map_or(true, |last| now.duration_since(last) >= self.config.interval);
        if due {
            self.pending = false;
            self.last_pass = Some(now);
        }
        due
    }
}

impl Default for ReapplyThrottle {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle_at(start: Instant) -> ReapplyThrottle {
        let mut t = ReapplyThrottle::new(
            ThrottleConfig::default().with_interval(Duration::from_millis(200)),
        );
        // consume the free first pass so tests start mid-stream
        t.note_mutation(start);
        assert!(t.poll(start));
        t
    }

    #[test]
    fn first_mutation_fires_immediately() {
        let start = Instant::now();
        let mut t = ReapplyThrottle::default();
        assert!(!t.poll(start));
        t.note_mutation(start);
        assert!(t.poll(start));
        // nothing pending afterwards
        assert!(!t.poll(start));
    }

    #[test]
    fn burst_coalesces_to_one_trailing_pass() {
        let start = Instant::now();
        let mut t = throttle_at(start);

        for ms in [10u64, 40, 80, 120] {
            t.note_mutation(start + Duration::from_millis(ms));
            assert!(!t.poll(start + Duration::from_millis(ms)));
        }
        // still inside the interval
        assert!(!t.poll(start + Duration::from_millis(199)));
        // trailing edge fires once
        assert!(t.poll(start + Duration::from_millis(200)));
        assert!(!t.poll(start + Duration::from_millis(201)));
    }

    #[test]
    fn interval_restarts_after_each_pass() {
        let start = Instant::now();
        let mut t = throttle_at(start);

        t.note_mutation(start + Duration::from_millis(250));
        assert!(t.poll(start + Duration::from_millis(250)));

        t.note_mutation(start + Duration::from_millis(300));
        assert!(!t.poll(start + Duration::from_millis(300)));
        assert!(t.poll(start + Duration::from_millis(450)));
    }
}
