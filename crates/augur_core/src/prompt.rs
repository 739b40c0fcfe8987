//! Prompt construction.

use crate::{Message, Role};

/// Index the model is asked to reason about when none is configured.
pub const DEFAULT_STOCK_INDEX: &str = "CBOE Volatility Index";

/// Builds the scoring prompt for one headline.
///
/// The month is zero-padded so prompts are identical whatever the store
/// returned.
///
/// # Examples
///
/// ```
/// use augur_core::{build_prompt, Role, DEFAULT_STOCK_INDEX};
///
/// let messages = build_prompt(2008, 9, "Lehman files for bankruptcy", DEFAULT_STOCK_INDEX);
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].role, Role::System);
/// assert!(messages[0].content.contains("09/2008"));
/// assert!(messages[0].content.ends_with("Lehman files for bankruptcy"));
/// ```
pub fn build_prompt(year: i32, month: u32, headline: &str, stock_index: &str) -> Vec<Message> {
    let content = format!(
        "Forget all previous instructions. You are now a financial expert analyzing the stock \
         market in {month:02}/{year}. Upon receiving a news headline, assess its impact on \
         {stock_index} prices. Predict whether the headline suggests a rise or drop in prices by \
         providing a number on a scale from 1 to 100, where 1 signifies a significant decrease, \
         100 signifies a significant increase, and 50 indicates uncertainty. Your response should \
         be limited to this numerical prediction only, based on the given headline: {headline}"
    );
    vec![Message::new(Role::System, content)]
}
