//! Token counting for chat payloads.

use augur_core::Message;
use augur_error::{ModelsError, ModelsErrorKind, ModelsResult};
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Framing tokens charged for every message.
const TOKENS_PER_MESSAGE: usize = 3;
/// Extra token charged when a message carries a `name`.
const TOKENS_PER_NAME: usize = 1;
/// Every reply is primed with `<|start|>assistant<|message|>`.
const REPLY_PRIMING_TOKENS: usize = 3;

/// Load the tokenizer for `model`, falling back to `cl100k_base`.
///
/// # Errors
///
/// Returns [`ModelsErrorKind::TokenCountingFailed`] if even the fallback
/// encoding cannot be loaded.
pub fn tokenizer_for_model(model: &str) -> ModelsResult<CoreBPE> {
    match tiktoken_rs::get_bpe_from_model(model) {
        Ok(tokenizer) => Ok(tokenizer),
        Err(e) => {
            warn!(model, error = %e, "Model not found, using cl100k_base encoding");
            tiktoken_rs::cl100k_base().map_err(|e| {
                ModelsError::new(ModelsErrorKind::TokenCountingFailed(format!(
                    "Failed to load tokenizer: {}",
                    e
                )))
            })
        }
    }
}

/// Count the tokens of a bare text.
pub fn count_tokens(text: &str, tokenizer: &CoreBPE) -> usize {
    tokenizer.encode_with_special_tokens(text).len()
}

/// Count the tokens of a structured chat payload.
///
/// Every field of every message is encoded, plus the per-message framing,
/// the per-name surcharge and the reply priming.
pub fn count_message_tokens(messages: &[Message], tokenizer: &CoreBPE) -> usize {
    let fields: usize = messages
        .iter()
        .map(|message| {
            TOKENS_PER_MESSAGE
                + message
                    .field_values()
                    .iter()
                    .map(|(key, value)| {
                        let surcharge = if *key == "name" { TOKENS_PER_NAME } else { 0 };
                        count_tokens(value, tokenizer) + surcharge
                    })
                    .sum::<usize>()
        })
        .sum();
    fields + REPLY_PRIMING_TOKENS
}
