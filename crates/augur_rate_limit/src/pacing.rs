//! Fixed-rate pacing of call start times.

use crate::PacingConfig;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces call start times at least one interval apart.
///
/// The gate is independent of the server quota: it keeps the request stream
/// smooth even while the quota is plentiful. Each reservation starts the
/// next interval from the slot it handed out, so a caller that idles and
/// then comes back is served immediately, never earlier than one interval
/// after the previous slot.
#[derive(Debug, Clone)]
pub struct PacingGate {
    interval: Duration,
    next_allowed: Option<Instant>,
}

impl PacingGate {
    /// Create a gate with the given spacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: None,
        }
    }

    /// Create a gate from the configured requests per minute.
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.interval())
    }

    /// Spacing between consecutive slots.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Earliest slot a call could take at `now`, without reserving it.
    pub fn next_slot(&self, now: Instant) -> Instant {
        self.next_allowed.map_or(now, |next| next.max(now))
    }

    /// Reserve the earliest slot not before `not_before` and advance the gate.
    ///
    /// `not_before` carries every other wait the caller must honor (quota
    /// reset, retry hint, backoff), so the returned slot satisfies all of them.
    pub fn reserve(&mut self, not_before: Instant) -> Instant {
        let slot = self.next_slot(not_before);
        self.next_allowed = Some(slot.checked_add(self.interval).unwrap_or(slot));
        slot
    }
}
