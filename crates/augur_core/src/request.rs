//! Request payload for the completion endpoint.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Chat completion request body.
///
/// # Examples
///
/// ```
/// use augur_core::{CompletionRequest, Message, Role};
///
/// let request = CompletionRequest::new("gpt-4-0125-preview", vec![Message::new(Role::System, "hi")]);
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["messages"][0]["role"], "system");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CompletionRequest {
    /// Model identifier to use
    model: String,
    /// The conversation messages to send
    messages: Vec<Message>,
}

impl CompletionRequest {
    /// Creates a request for `model` with the given messages.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}
