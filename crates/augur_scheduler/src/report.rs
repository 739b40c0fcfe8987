//! Per-record outcomes and the run summary.

use augur_core::Score;
use augur_models::CostLedger;
use augur_rate_limit::{AbandonReason, RetryCounters};

/// How one record ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Score persisted
    Done {
        /// The stored score
        score: Score,
        /// Attempts it took
        counters: RetryCounters,
    },
    /// Given up; nothing persisted
    Abandoned {
        /// Why
        reason: AbandonReason,
        /// Attempts made
        counters: RetryCounters,
        /// Last failure seen
        last_error: String,
    },
    /// The operator stopped the run while this record was in progress
    Aborted {
        /// Attempts made
        counters: RetryCounters,
    },
}

/// Why a run ended before its last record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,
    /// The operator aborted at this record
    Aborted(i32),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::Aborted(id) => write!(f, "aborted at record {}", id),
        }
    }
}

/// Summary of a scoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct RunReport {
    /// Records scored and persisted
    done: usize,
    /// Records given up
    abandoned: usize,
    /// Records never attempted because the run stopped
    skipped: usize,
    /// Set when the run ended early
    stopped: Option<StopReason>,
    /// Cost of every billed attempt
    ledger: CostLedger,
}

impl RunReport {
    pub(crate) fn count(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Done { .. } => self.done += 1,
            RecordOutcome::Abandoned { .. } | RecordOutcome::Aborted { .. } => self.abandoned += 1,
        }
    }

    pub(crate) fn stop(&mut self, reason: StopReason, skipped: usize) {
        self.stopped = Some(reason);
        self.skipped = skipped;
    }

    pub(crate) fn set_ledger(&mut self, ledger: CostLedger) {
        self.ledger = ledger;
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} done, {} abandoned, {} skipped; cost {}",
            self.done, self.abandoned, self.skipped, self.ledger
        )?;
        if let Some(reason) = self.stopped {
            write!(f, " (stopped: {})", reason)?;
        }
        Ok(())
    }
}
