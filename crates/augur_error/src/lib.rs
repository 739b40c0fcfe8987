//! Error types for the augur workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use augur_error::{AugurResult, ModelsError, ModelsErrorKind};
//!
//! fn fetch_data() -> AugurResult<String> {
//!     Err(ModelsError::new(ModelsErrorKind::Transport("Connection refused".into())))?
//! }
//!
//! assert!(fetch_data().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod models;
mod rate_limit;
mod scheduler;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{AugurError, AugurErrorKind, AugurResult};
pub use models::{ModelsError, ModelsErrorKind, ModelsResult, RetryableError};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
pub use scheduler::{SchedulerError, SchedulerErrorKind};
