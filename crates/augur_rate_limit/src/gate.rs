//! The single suspension point between attempts.

use crate::{MAX_WAIT, PacingConfig, PacingGate, QuotaState, QuotaTracker, deadline_after};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument};

/// What [`SlotGate::await_slot`] granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct SlotGrant {
    /// When the call was cleared to start
    dispatch_at: Instant,
    /// Time spent asleep before the slot
    waited: Duration,
    /// Whether the server quota forced the wait
    quota_blocked: bool,
}

#[derive(Debug)]
struct GateState {
    quota: QuotaTracker,
    pacing: PacingGate,
}

/// Quota tracker and pacing gate behind one lock.
///
/// Reading the quota, deciding how long to wait and advancing the pacing
/// gate happen in one critical section. Sleeping happens outside it, so
/// several workers sharing a gate each get a distinct slot and none of them
/// holds the lock while asleep.
///
/// # Example
///
/// ```rust,ignore
/// let gate = SlotGate::new(PacingGate::from_config(&config.pacing));
/// let grant = gate.await_slot(estimated_tokens, None).await;
/// let reply = driver.complete(&request).await?;
/// gate.record_response(reply.headers()).await;
/// ```
#[derive(Debug, Clone)]
pub struct SlotGate {
    state: Arc<Mutex<GateState>>,
}

impl SlotGate {
    /// Create a gate with fresh quota state.
    pub fn new(pacing: PacingGate) -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState {
                quota: QuotaTracker::new(),
                pacing,
            })),
        }
    }

    /// Create a gate paced by the configured rate.
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(PacingGate::from_config(config))
    }

    /// Sleep until a call costing `tokens_needed` may start.
    ///
    /// Composes every wait source: the pacing interval, the quota reset when
    /// the server reports too little budget, and an extra `delay` the caller
    /// must honor (a retry hint or a backoff). Returns once, at the latest of
    /// them. Each wait is clamped to [`MAX_WAIT`].
    #[instrument(skip(self))]
    pub async fn await_slot(&self, tokens_needed: u64, delay: Option<Duration>) -> SlotGrant {
        let now = Instant::now();

        let (dispatch_at, quota_blocked) = {
            let mut state = self.state.lock().await;
            let mut not_before = deadline_after(now, delay.unwrap_or_default());
            let quota_wait = state.quota.wait_for(tokens_needed, now);
            if let Some(wait) = quota_wait {
                debug!(
                    wait_ms = wait.as_millis() as u64,
                    remaining_requests = *state.quota.state().remaining_requests(),
                    remaining_tokens = *state.quota.state().remaining_tokens(),
                    "Quota exhausted, waiting for reset"
                );
                not_before = not_before.max(deadline_after(now, wait));
            }
            (state.pacing.reserve(not_before), quota_wait.is_some())
        };

        let waited = dispatch_at.saturating_duration_since(now);
        if !waited.is_zero() {
            debug!(wait_ms = waited.as_millis() as u64, "Sleeping until slot");
            sleep_until(dispatch_at).await;
        }

        SlotGrant {
            dispatch_at,
            waited,
            quota_blocked,
        }
    }

    /// Feed response headers to the quota tracker.
    ///
    /// Returns true if the headers replaced the tracked quota.
    pub async fn record_response(&self, headers: &HeaderMap) -> bool {
        self.state.lock().await.quota.update(headers)
    }

    /// Snapshot of the tracked quota.
    pub async fn quota(&self) -> QuotaState {
        *self.state.lock().await.quota.state()
    }
}
