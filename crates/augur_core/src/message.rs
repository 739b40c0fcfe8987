//! Message types for completion requests.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// # Examples
///
/// ```
/// use augur_core::{Message, Role};
///
/// let message = Message::new(Role::System, "Answer with a number.");
/// assert_eq!(message.role, Role::System);
/// assert!(message.name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text of the message
    pub content: String,
    /// Optional participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Creates an unnamed message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    /// Attaches a participant name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Every field value of the message, in wire order.
    ///
    /// Token accounting charges for each of these.
    pub fn field_values(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("role", self.role.to_string()), ("content", self.content.clone())];
        if let Some(name) = &self.name {
            fields.push(("name", name.clone()));
        }
        fields
    }
}
