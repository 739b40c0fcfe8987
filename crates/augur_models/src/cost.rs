//! Cost accounting in fixed-precision decimal.

use crate::{count_message_tokens, count_tokens, tokenizer_for_model};
use augur_core::CompletionRequest;
use augur_error::AugurResult;
use augur_rate_limit::PricingConfig;
use rust_decimal::Decimal;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Running totals of everything charged so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct CostLedger {
    /// Accumulated cost in USD
    total_cost: Decimal,
    /// Accumulated request tokens
    tokens_in: u64,
    /// Accumulated response tokens
    tokens_out: u64,
    /// Number of charged attempts
    attempts: u64,
}

impl std::fmt::Display for CostLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "${} ({} attempts, {} tokens in, {} tokens out)",
            self.total_cost, self.attempts, self.tokens_in, self.tokens_out
        )
    }
}

/// Prices completion attempts and keeps the ledger.
///
/// Request tokens are counted over the full structured payload, response
/// tokens over the answer text alone. All arithmetic is [`Decimal`].
///
/// # Example
///
/// ```no_run
/// use augur_core::{CompletionRequest, Message, Role};
/// use augur_models::CostAccountant;
/// use rust_decimal::Decimal;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut accountant = CostAccountant::new(
///     "gpt-4-0125-preview",
///     Decimal::new(1, 5),
///     Decimal::new(3, 5),
/// )?;
/// let request = CompletionRequest::new("gpt-4-0125-preview", vec![Message::new(Role::System, "hi")]);
/// accountant.record(&request, "50");
/// println!("{}", accountant.ledger());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CostAccountant {
    tokenizer: Arc<CoreBPE>,
    input_token_usd: Decimal,
    output_token_usd: Decimal,
    ledger: CostLedger,
}

impl std::fmt::Debug for CostAccountant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostAccountant")
            .field("input_token_usd", &self.input_token_usd)
            .field("output_token_usd", &self.output_token_usd)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl CostAccountant {
    /// Create an accountant for `model` with the given unit prices.
    ///
    /// # Errors
    ///
    /// Fails if no tokenizer can be loaded.
    pub fn new(
        model: &str,
        input_token_usd: Decimal,
        output_token_usd: Decimal,
    ) -> AugurResult<Self> {
        Ok(Self {
            tokenizer: Arc::new(tokenizer_for_model(model)?),
            input_token_usd,
            output_token_usd,
            ledger: CostLedger::default(),
        })
    }

    /// Create an accountant from the configured decimal price strings.
    ///
    /// # Errors
    ///
    /// Fails if a price is not a non-negative decimal or no tokenizer can be
    /// loaded.
    pub fn from_config(pricing: &PricingConfig, model: &str) -> AugurResult<Self> {
        Self::new(model, pricing.input_price()?, pricing.output_price()?)
    }

    /// Tokens charged for a request payload.
    pub fn request_tokens(&self, request: &CompletionRequest) -> u64 {
        count_message_tokens(request.messages(), &self.tokenizer) as u64
    }

    /// Tokens charged for an answer.
    pub fn response_tokens(&self, response_text: &str) -> u64 {
        count_tokens(response_text, &self.tokenizer) as u64
    }

    /// Price of one attempt, without touching the ledger.
    pub fn cost(&self, request: &CompletionRequest, response_text: &str) -> Decimal {
        self.price(self.request_tokens(request), self.response_tokens(response_text))
    }

    /// Price one attempt and add it to the ledger. Returns the attempt's cost.
    pub fn record(&mut self, request: &CompletionRequest, response_text: &str) -> Decimal {
        let tokens_in = self.request_tokens(request);
        let tokens_out = self.response_tokens(response_text);
        let cost = self.price(tokens_in, tokens_out);

        self.ledger.total_cost += cost;
        self.ledger.tokens_in += tokens_in;
        self.ledger.tokens_out += tokens_out;
        self.ledger.attempts += 1;

        debug!(
            tokens_in,
            tokens_out,
            cost = %cost,
            total_cost = %self.ledger.total_cost,
            "Charged attempt"
        );
        cost
    }

    /// Totals so far.
    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    fn price(&self, tokens_in: u64, tokens_out: u64) -> Decimal {
        Decimal::from(tokens_in) * self.input_token_usd
            + Decimal::from(tokens_out) * self.output_token_usd
    }
}
