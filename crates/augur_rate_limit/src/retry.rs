//! Per-record retry decisions.
//!
//! Every attempt ends in an [`AttemptOutcome`]. [`RetryPolicy::decide`] maps
//! it to a [`RetryDecision`] and charges the matching budget in
//! [`RetryCounters`]. The budgets are independent: invalid answers never use
//! up transient retries and vice versa, and hinted rate limit waits have
//! their own bound.

use crate::RetryConfig;
use augur_core::Score;
use std::time::Duration;
use tokio_retry2::strategy::jitter;

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The model answered with a score in range
    Valid(Score),
    /// The model answered, but not with a usable score
    InvalidOutput(String),
    /// Network failure, timeout, server error or malformed envelope
    Transient(String),
    /// The endpoint refused the call for rate reasons
    RateLimited {
        /// Wait the endpoint asked for, if it said
        hint: Option<Duration>,
        /// Error message from the endpoint
        message: String,
    },
    /// The endpoint refused the call for good (bad request, auth)
    Rejected(String),
}

/// Why a record was given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum AbandonReason {
    /// Transient retry budget exhausted
    #[strum(to_string = "transient retry limit reached")]
    TransientLimit,
    /// Invalid output budget exhausted
    #[strum(to_string = "invalid output limit reached")]
    InvalidLimit,
    /// Too many hinted rate limit waits
    #[strum(to_string = "rate limit wait limit reached")]
    RateLimitWaits,
    /// Non-retryable rejection from the endpoint
    #[strum(to_string = "rejected by endpoint")]
    Rejected,
    /// The operator chose to skip the record
    #[strum(to_string = "abandoned by operator")]
    Operator,
}

/// What the scheduler should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Persist the score and move on
    Proceed(Score),
    /// Sleep this long (on top of pacing) and retry
    Backoff(Duration),
    /// Retry at the next pacing slot
    RetryNow,
    /// Sleep exactly the hinted time and retry
    WaitHint(Duration),
    /// Rate limited without a hint; someone has to decide
    Escalate(String),
    /// Give up on this record
    Abandon(AbandonReason),
}

/// Attempt counts for one record. Reset at record start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryCounters {
    /// Answers that failed validation
    invalid_output_count: usize,
    /// Transient failures, including unexplained rate limits retried as such
    transient_error_count: usize,
    /// Hinted rate limit waits
    rate_limit_wait_count: usize,
}

/// Bounded retry policy with exponential backoff.
///
/// # Example
///
/// ```
/// use augur_rate_limit::{AttemptOutcome, RetryCounters, RetryDecision, RetryPolicy};
///
/// let policy = RetryPolicy::new(3, 5, 10, 1000, 60).with_jitter(false);
/// let mut counters = RetryCounters::default();
///
/// let decision = policy.decide(&AttemptOutcome::Transient("reset".into()), &mut counters);
/// assert_eq!(decision, RetryDecision::Backoff(std::time::Duration::from_secs(1)));
/// assert_eq!(*counters.transient_error_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_transient_retries: usize,
    max_invalid_retries: usize,
    max_rate_limit_waits: usize,
    initial_backoff_ms: u64,
    max_backoff: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// Create a policy with explicit bounds. Jitter is on.
    pub fn new(
        max_transient_retries: usize,
        max_invalid_retries: usize,
        max_rate_limit_waits: usize,
        initial_backoff_ms: u64,
        max_backoff_secs: u64,
    ) -> Self {
        Self {
            max_transient_retries,
            max_invalid_retries,
            max_rate_limit_waits,
            initial_backoff_ms: initial_backoff_ms.max(1),
            max_backoff: Duration::from_secs(max_backoff_secs),
            jitter: true,
        }
    }

    /// Create a policy from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_transient_retries,
            config.max_invalid_retries,
            config.max_rate_limit_waits,
            config.initial_backoff_ms,
            config.max_backoff_secs,
        )
    }

    /// Turn randomized jitter on or off.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Map an outcome to a decision, charging the matching budget.
    ///
    /// An unexplained rate limit is not charged here; the caller resolves the
    /// [`RetryDecision::Escalate`] and, if it chooses to back off, charges the
    /// transient budget through [`RetryPolicy::charge_transient`].
    pub fn decide(&self, outcome: &AttemptOutcome, counters: &mut RetryCounters) -> RetryDecision {
        match outcome {
            AttemptOutcome::Valid(score) => RetryDecision::Proceed(*score),
            AttemptOutcome::InvalidOutput(_) => {
                counters.invalid_output_count += 1;
                if counters.invalid_output_count > self.max_invalid_retries {
                    RetryDecision::Abandon(AbandonReason::InvalidLimit)
                } else {
                    RetryDecision::RetryNow
                }
            }
            AttemptOutcome::Transient(_) => self
                .charge_transient(counters)
                .map_or(RetryDecision::Abandon(AbandonReason::TransientLimit), RetryDecision::Backoff),
            AttemptOutcome::RateLimited {
                hint: Some(wait), ..
            } => {
                counters.rate_limit_wait_count += 1;
                if counters.rate_limit_wait_count > self.max_rate_limit_waits {
                    RetryDecision::Abandon(AbandonReason::RateLimitWaits)
                } else {
                    RetryDecision::WaitHint(*wait)
                }
            }
            AttemptOutcome::RateLimited {
                hint: None,
                message,
            } => RetryDecision::Escalate(message.clone()),
            AttemptOutcome::Rejected(_) => RetryDecision::Abandon(AbandonReason::Rejected),
        }
    }

    /// Charge one transient failure.
    ///
    /// Returns the backoff before the next attempt, or `None` once the
    /// transient budget is spent.
    pub fn charge_transient(&self, counters: &mut RetryCounters) -> Option<Duration> {
        counters.transient_error_count += 1;
        (counters.transient_error_count <= self.max_transient_retries)
            .then(|| self.backoff_delay(counters.transient_error_count))
    }

    /// Delay before retry number `attempt` (1-based), with jitter if enabled.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let nominal = self.nominal_delay(attempt);
        if self.jitter { jitter(nominal) } else { nominal }
    }

    /// Delay before retry number `attempt` (1-based) without jitter.
    ///
    /// Starts at the initial backoff and doubles per retry, capped at the
    /// maximum.
    pub fn nominal_delay(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        2u64.checked_pow(doublings)
            .and_then(|scale| scale.checked_mul(self.initial_backoff_ms))
            .map_or(self.max_backoff, Duration::from_millis)
            .min(self.max_backoff)
    }
}
