//! Trait definitions for the augur headline scoring pipeline.
//!
//! The scheduler only talks to the outside world through these seams: a
//! [`CompletionDriver`] that reaches the model endpoint and a [`RecordStore`]
//! that yields headlines and accepts scores.

mod traits;
mod types;

pub use traits::{CompletionDriver, RecordStore};
pub use types::CompletionReply;
