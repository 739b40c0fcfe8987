//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, ModelsError, RateLimitError, SchedulerError};

/// Every failure the workspace can surface.
///
/// # Examples
///
/// ```
/// use augur_error::{AugurError, AugurErrorKind, ConfigError};
///
/// let err: AugurError = ConfigError::new("model must not be empty").into();
/// assert!(matches!(err.kind(), AugurErrorKind::Config(_)));
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AugurErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Record store error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Completion endpoint error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Rate limit bookkeeping error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Run-level scheduler error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Augur error with kind discrimination.
///
/// # Examples
///
/// ```
/// use augur_error::{AugurResult, ConfigError};
///
/// fn might_fail() -> AugurResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Augur Error: {}", _0)]
pub struct AugurError(Box<AugurErrorKind>);

impl AugurError {
    /// Create a new error from a kind.
    pub fn new(kind: AugurErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AugurErrorKind {
        &self.0
    }
}

impl<T> From<T> for AugurError
where
    T: Into<AugurErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for augur operations.
pub type AugurResult<T> = std::result::Result<T, AugurError>;
