//! Dry-run cost projection.

use augur_core::{CompletionRequest, Record, build_prompt};
use augur_models::{CostAccountant, CostLedger};
use tracing::{debug, instrument};

/// Answer assumed for every record when projecting cost.
pub const ASSUMED_ANSWER: &str = "50";

/// Project the cost of scoring `records` once each, without calling the endpoint.
///
/// Every record is priced as a single attempt answered with
/// [`ASSUMED_ANSWER`]; retries are not projected.
#[instrument(skip(records, accountant), fields(records = records.len()))]
pub fn estimate_cost(
    records: &[Record],
    mut accountant: CostAccountant,
    model: &str,
    stock_index: &str,
) -> CostLedger {
    for record in records {
        let messages = build_prompt(*record.year(), *record.month(), record.headline(), stock_index);
        let request = CompletionRequest::new(model, messages);
        accountant.record(&request, ASSUMED_ANSWER);
    }
    let ledger = *accountant.ledger();
    debug!(total_cost = %ledger.total_cost(), "Projected cost");
    ledger
}
