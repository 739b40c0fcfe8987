//! Dry-run cost projection command handler.

use augur_database::{SqliteRecordStore, database_url};
use augur_interface::RecordStore;
use augur_models::CostAccountant;
use augur_rate_limit::AugurConfig;
use augur_scheduler::estimate_cost;
use tracing::instrument;

/// Print the projected cost of scoring the pending (or all) headlines once.
#[instrument(skip(config))]
pub async fn estimate(config: &AugurConfig, rescore: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteRecordStore::open(&database_url(&config.database.url))?;
    let records = store.records(rescore).await?;
    let accountant = CostAccountant::from_config(&config.pricing, &config.endpoint.model)?;

    let ledger = estimate_cost(
        &records,
        accountant,
        &config.endpoint.model,
        &config.prompt.stock_index,
    );
    println!(
        "{} headlines with {}: projected ${} ({} tokens in, {} tokens out)",
        records.len(),
        config.endpoint.model,
        ledger.total_cost(),
        ledger.tokens_in(),
        ledger.tokens_out()
    );
    Ok(())
}
