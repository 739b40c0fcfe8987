//! Scheduler error types.

/// Conditions that stop a scoring run as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// Operator chose to stop after an unexplained rate limit rejection
    #[display("Run aborted by operator at record {}", _0)]
    Aborted(i32),
    /// Operator decision could not be obtained
    #[display("Operator decision failed: {}", _0)]
    Decision(String),
}

/// Scheduler error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at line {} in {}", kind, line, file)]
pub struct SchedulerError {
    /// The kind of error that occurred
    pub kind: SchedulerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new scheduler error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
