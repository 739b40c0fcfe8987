//! Pluggable handling of rate limits that carry no retry hint.

use async_trait::async_trait;
use augur_core::Record;
use augur_error::AugurResult;
use augur_rate_limit::UnexplainedRateLimit;
use std::sync::Arc;

/// What to do about an unexplained rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RateLimitChoice {
    /// Treat it as a transient failure and back off
    Backoff,
    /// Give up on this record and continue
    Abandon,
    /// Stop the run
    Abort,
}

impl From<UnexplainedRateLimit> for RateLimitChoice {
    fn from(policy: UnexplainedRateLimit) -> Self {
        match policy {
            UnexplainedRateLimit::Backoff => Self::Backoff,
            UnexplainedRateLimit::Abandon => Self::Abandon,
            UnexplainedRateLimit::Abort => Self::Abort,
        }
    }
}

/// Decides how to proceed after a rate limit without a usable wait hint.
#[async_trait]
pub trait RateLimitDecider: Send + Sync {
    /// Choose for `record`, given the endpoint's error `message`.
    async fn decide(&self, record: &Record, message: &str) -> AugurResult<RateLimitChoice>;
}

/// Always backs off.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackoffDecider;

#[async_trait]
impl RateLimitDecider for BackoffDecider {
    async fn decide(&self, _record: &Record, _message: &str) -> AugurResult<RateLimitChoice> {
        Ok(RateLimitChoice::Backoff)
    }
}

/// Always gives up on the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbandonDecider;

#[async_trait]
impl RateLimitDecider for AbandonDecider {
    async fn decide(&self, _record: &Record, _message: &str) -> AugurResult<RateLimitChoice> {
        Ok(RateLimitChoice::Abandon)
    }
}

/// Always stops the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortDecider;

#[async_trait]
impl RateLimitDecider for AbortDecider {
    async fn decide(&self, _record: &Record, _message: &str) -> AugurResult<RateLimitChoice> {
        Ok(RateLimitChoice::Abort)
    }
}

/// The fixed decider for a configured policy.
pub fn decider_for(policy: UnexplainedRateLimit) -> Arc<dyn RateLimitDecider> {
    match RateLimitChoice::from(policy) {
        RateLimitChoice::Backoff => Arc::new(BackoffDecider),
        RateLimitChoice::Abandon => Arc::new(AbandonDecider),
        RateLimitChoice::Abort => Arc::new(AbortDecider),
    }
}
