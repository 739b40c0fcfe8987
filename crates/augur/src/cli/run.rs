//! Scoring run command handler.

use crate::cli::StdinDecider;
use augur_database::{SqliteRecordStore, database_url};
use augur_error::{SchedulerError, SchedulerErrorKind};
use augur_models::OpenAiClient;
use augur_rate_limit::AugurConfig;
use augur_scheduler::{RequestScheduler, StopReason};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Configuration from `path` over the bundled defaults, or the usual layered sources.
pub fn load_config(path: Option<&Path>) -> Result<AugurConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AugurConfig::from_file(path)?,
        None => AugurConfig::load()?,
    };
    Ok(config)
}

/// Score pending headlines until done, cancelled or aborted.
///
/// Ctrl-C lets the current record finish and stops at the next one. An
/// operator abort is returned as an error so the process exits non-zero.
#[instrument(skip(config))]
pub async fn run_scoring(
    config: &AugurConfig,
    rescore: bool,
    interactive: bool,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let driver = Arc::new(OpenAiClient::from_config(&config.endpoint)?);
    let store = Arc::new(SqliteRecordStore::open(&database_url(&config.database.url))?);

    let mut scheduler = RequestScheduler::new(driver, store, config)?;
    if interactive {
        scheduler = scheduler.with_decider(Arc::new(StdinDecider));
    }

    let token = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current headline");
            token.cancel();
        }
    });

    info!(model = %config.endpoint.model, rescore, ?limit, "Starting");
    let report = scheduler.run(rescore, limit).await?;
    println!("{}", report);

    if let Some(StopReason::Aborted(id)) = report.stopped() {
        return Err(SchedulerError::new(SchedulerErrorKind::Aborted(*id)).into());
    }
    Ok(())
}
