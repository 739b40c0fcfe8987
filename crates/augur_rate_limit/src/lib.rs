//! Rate limiting and retry policy.
//!
//! This crate decides *when* the next completion call may start and *what to
//! do* with its outcome:
//!
//! - [`QuotaTracker`] mirrors the quota the endpoint reports in its
//!   `x-ratelimit-*` headers.
//! - [`PacingGate`] spaces call start times evenly at a fixed target rate.
//! - [`SlotGate`] combines both behind one lock and is the single place the
//!   scheduler sleeps.
//! - [`RetryPolicy`] turns an attempt outcome into a retry decision.
//!
//! Configuration for the whole pipeline ([`AugurConfig`]) lives here as well.

mod config;
mod duration;
mod gate;
mod pacing;
mod quota;
mod retry;

pub use config::{
    AugurConfig, DatabaseConfig, EndpointConfig, PacingConfig, PricingConfig, PromptConfig,
    QuotaConfig, RetryConfig, UnexplainedRateLimit,
};
pub use duration::{MAX_WAIT, deadline_after, parse_duration, retry_hint};
pub use gate::{SlotGate, SlotGrant};
pub use pacing::PacingGate;
pub use quota::{QuotaHeaders, QuotaState, QuotaTracker, parse_quota_headers};
pub use retry::{AbandonReason, AttemptOutcome, RetryCounters, RetryDecision, RetryPolicy};
