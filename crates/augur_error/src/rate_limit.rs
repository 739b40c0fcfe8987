//! Error types for rate limiting operations.

/// Error kinds for rate limiting operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Duration string matched none of the h/m/s segments.
    #[display("Unparsable duration: '{}'", _0)]
    DurationParse(String),
    /// Required rate limit header absent from the response.
    #[display("Missing header: {}", _0)]
    MissingHeader(String),
    /// Header present but not a valid value.
    #[display("Invalid header {}: '{}'", name, value)]
    InvalidHeader {
        /// Header name
        name: String,
        /// Raw header value
        value: String,
    },
}

/// Rate limiting error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new rate limiting error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RateLimitErrorKind {
        &self.kind
    }
}
