//! Completion endpoint integration for augur.
//!
//! - [`OpenAiClient`] sends chat completion requests to an OpenAI-compatible
//!   endpoint and hands back the raw reply.
//! - [`classify_reply`] interprets a reply: completion text, rate limit,
//!   permanent rejection or malformed envelope.
//! - [`CostAccountant`] prices requests and answers from token counts.
//!
//! # Example
//!
//! ```no_run
//! use augur_core::{CompletionRequest, build_prompt};
//! use augur_interface::CompletionDriver;
//! use augur_models::{OpenAiClient, ReplyClass, classify_reply};
//! use augur_rate_limit::AugurConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AugurConfig::load()?;
//! let client = OpenAiClient::from_config(&config.endpoint)?;
//! let messages = build_prompt(2008, 9, "Lehman files for bankruptcy", &config.prompt.stock_index);
//! let request = CompletionRequest::new(client.model_name(), messages);
//! let reply = client.complete(&request).await?;
//! if let ReplyClass::Completion(text) = classify_reply(&reply) {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cost;
mod openai;
mod token_counting;

pub use cost::{CostAccountant, CostLedger};
pub use openai::{OpenAiClient, ReplyClass, classify_reply};
pub use token_counting::{count_message_tokens, count_tokens, tokenizer_for_model};
