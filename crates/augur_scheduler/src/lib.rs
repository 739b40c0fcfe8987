//! Scoring scheduler for augur.
//!
//! [`RequestScheduler`] walks the record stream, asks the endpoint for a
//! score per headline, and retries within bounded budgets:
//!
//! - answers that are not an integer in 1..=100 are retried at the next
//!   pacing slot ([`ResponseValidator`]);
//! - transient failures back off exponentially with jitter;
//! - hinted rate limits sleep exactly the hinted time;
//! - unexplained rate limits are handed to a [`RateLimitDecider`].
//!
//! A record that exhausts a budget is abandoned and the run moves on.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decider;
mod estimate;
mod report;
mod scheduler;
mod validator;

pub use decider::{
    AbandonDecider, AbortDecider, BackoffDecider, RateLimitChoice, RateLimitDecider, decider_for,
};
pub use estimate::{ASSUMED_ANSWER, estimate_cost};
pub use report::{RecordOutcome, RunReport, StopReason};
pub use scheduler::RequestScheduler;
pub use validator::ResponseValidator;
