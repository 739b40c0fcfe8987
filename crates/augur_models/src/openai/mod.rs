//! OpenAI-compatible chat completions.

mod classify;
mod client;
mod dto;

pub use classify::{ReplyClass, classify_reply};
pub use client::OpenAiClient;
