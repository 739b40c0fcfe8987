//! Response envelopes of the chat completions endpoint.

use serde::Deserialize;

/// Successful completion body. Only the fields augur reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletion {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub(crate) message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

/// Failure body: `{"error": {"message": ..., "type": ..., "code": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) code: Option<serde_json::Value>,
}

impl ApiError {
    /// True if the type or code names a rate limit.
    pub(crate) fn mentions_rate_limit(&self) -> bool {
        let code = self
            .code
            .as_ref()
            .and_then(|code| code.as_str())
            .unwrap_or_default();
        [self.kind.as_deref().unwrap_or_default(), code]
            .iter()
            .any(|field| field.to_ascii_lowercase().contains("rate_limit"))
    }
}
