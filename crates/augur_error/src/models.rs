//! Completion endpoint errors and retry classification.

/// Completion endpoint error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelsErrorKind {
    /// API key environment variable not set
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),
    /// Failed to build the HTTP client
    #[display("Failed to create client: {}", _0)]
    ClientCreation(String),
    /// Request never produced a response (DNS, connect, reset)
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// Request timed out
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// Tokenizer could not be loaded
    #[display("Token counting failed: {}", _0)]
    TokenCountingFailed(String),
}

impl ModelsErrorKind {
    /// True when the request may succeed if sent again.
    ///
    /// Only failures that produced no response qualify; configuration and
    /// tokenizer problems will not go away on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelsErrorKind::Transport(_) | ModelsErrorKind::Timeout(_))
    }
}

/// Completion endpoint error with location tracking.
///
/// # Examples
///
/// ```
/// use augur_error::{ModelsError, ModelsErrorKind, RetryableError};
///
/// let err = ModelsError::new(ModelsErrorKind::Transport("connection reset".into()));
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Errors that say whether the failed operation is worth repeating.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ModelsError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for completion endpoint operations.
pub type ModelsResult<T> = Result<T, ModelsError>;
