//! Time-based rotation decision.

use std::time::{Duration, Instant};

/// Rotate once the active file is at least `interval` old.
///
/// The check only runs when a line is about to be written, so an idle
/// period longer than the interval does not produce an empty file; the
/// rollover happens at the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    interval: Duration,
}

impl RotationPolicy {
    /// Policy rotating files older than `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Whether a file opened at `opened_at` must be replaced at `now`.
    pub fn is_due(&self, opened_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(opened_at) >= self.interval
    }
}
