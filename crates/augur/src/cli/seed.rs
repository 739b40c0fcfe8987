//! Headline import command handler.

use augur_database::{SqliteRecordStore, database_url, parse_ydm};
use augur_rate_limit::AugurConfig;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Lines imported and lines passed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Import `file` into the configured store.
#[instrument(skip(config), fields(file = %file.display()))]
pub fn seed(config: &AugurConfig, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(file)?;
    let store = SqliteRecordStore::open(&database_url(&config.database.url))?;

    let summary = seed_lines(&store, &text)?;
    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Seeded headlines"
    );
    println!(
        "Inserted {} headlines ({} lines skipped)",
        summary.inserted, summary.skipped
    );
    Ok(())
}

/// Insert every `YYYY-MM-DD<TAB>headline` line.
///
/// Blank lines are ignored; lines without a tab, with an unreadable date or
/// an empty headline are logged and skipped.
pub fn seed_lines(
    store: &SqliteRecordStore,
    text: &str,
) -> Result<SeedSummary, augur_error::DatabaseError> {
    let mut summary = SeedSummary::default();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((ydm, headline)) = line.split_once('\t') else {
            warn!(line = number + 1, "Skipping line without a tab");
            summary.skipped += 1;
            continue;
        };
        let headline = headline.trim();
        if parse_ydm(ydm).is_none() || headline.is_empty() {
            warn!(line = number + 1, ydm, "Skipping line with a bad date or empty headline");
            summary.skipped += 1;
            continue;
        }
        store.insert_headline(ydm.trim(), headline)?;
        summary.inserted += 1;
    }
    Ok(summary)
}
