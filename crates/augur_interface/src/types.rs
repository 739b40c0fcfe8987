//! Core type definitions for the augur interface.

use reqwest::header::HeaderMap;

/// Raw HTTP answer from the completion endpoint.
///
/// Drivers return every response that arrived, successful or not, so callers
/// can read rate limit headers before interpreting the body.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct CompletionReply {
    /// HTTP status code
    status: u16,
    /// Response headers, including the `x-ratelimit-*` family
    headers: HeaderMap,
    /// Undecoded response body
    body: String,
}

impl CompletionReply {
    /// Creates a reply from its parts.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
