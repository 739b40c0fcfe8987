//! Core data types for the augur headline scoring pipeline.
//!
//! This crate provides the records, scores and request payloads shared by
//! every other augur crate, plus the prompt builder.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod prompt;
mod record;
mod request;
mod role;

pub use message::Message;
pub use prompt::{DEFAULT_STOCK_INDEX, build_prompt};
pub use record::{Record, SCORE_MAX, SCORE_MIN, Score};
pub use request::CompletionRequest;
pub use role::Role;
