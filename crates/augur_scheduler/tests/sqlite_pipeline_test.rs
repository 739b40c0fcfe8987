//! Scheduler writing into a real SQLite store.

mod test_utils;

use augur_database::SqliteRecordStore;
use augur_scheduler::RequestScheduler;
use std::sync::Arc;
use test_utils::*;

#[tokio::test(start_paused = true)]
async fn test_scores_persist_and_resume() -> anyhow::Result<()> {
    let store = Arc::new(SqliteRecordStore::open(":memory:")?);
    store.insert_headline("2008-09-15", "Lehman Brothers files for bankruptcy")?;
    store.insert_headline("2008-09-16", "AIG receives federal rescue")?;
    store.insert_headline("2008-10-03", "Congress passes bailout bill")?;

    // Second record fails validation for good, the others score
    let driver = Arc::new(ScriptedDriver::new(vec![
        completion("12"),
        completion("maybe"),
        completion("unsure"),
        completion("none"),
        completion("64"),
    ]));
    let mut scheduler = RequestScheduler::new(driver.clone(), store.clone(), &test_config())?;

    let report = scheduler.run(false, None).await?;
    assert_eq!(*report.done(), 2);
    assert_eq!(*report.abandoned(), 1);

    let counts = store.counts()?;
    assert_eq!(counts.total, 3);
    assert_eq!(counts.scored, 2);

    let pending = store.rows(false)?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].headline, "AIG receives federal rescue");

    // A rerun only touches the abandoned record
    let driver = Arc::new(ScriptedDriver::new(vec![completion("30")]));
    let mut scheduler = RequestScheduler::new(driver.clone(), store.clone(), &test_config())?;
    let report = scheduler.run(false, None).await?;
    assert_eq!(*report.done(), 1);
    assert_eq!(driver.call_count(), 1);
    assert_eq!(store.counts()?.scored, 3);
    Ok(())
}
