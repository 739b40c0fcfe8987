//! SQLite record store tests against a temporary database file.

use augur_core::Score;
use augur_database::{SqliteRecordStore, StoreCounts, establish_connection};
use augur_error::{AugurErrorKind, DatabaseErrorKind};
use augur_interface::RecordStore;
use diesel::RunQueryDsl;

fn temp_store() -> anyhow::Result<(tempfile::TempDir, SqliteRecordStore)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("headlines.db");
    let store = SqliteRecordStore::open(path.to_str().unwrap())?;
    Ok((dir, store))
}

#[tokio::test]
async fn test_records_are_chronological() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    let late = store.insert_headline("2009-01-02", "Markets open the year higher")?;
    let early = store.insert_headline("2008-09-15", "Lehman Brothers files for bankruptcy")?;
    let same_day = store.insert_headline("2008-09-15", "Merrill Lynch sold to Bank of America")?;

    let records = store.records(true).await?;
    let ids: Vec<i32> = records.iter().map(|r| *r.id()).collect();
    assert_eq!(ids, vec![early, same_day, late]);

    let first = &records[0];
    assert_eq!(*first.year(), 2008);
    assert_eq!(*first.month(), 9);
    assert_eq!(first.headline(), "Lehman Brothers files for bankruptcy");
    Ok(())
}

#[tokio::test]
async fn test_scored_records_are_skipped_on_resume() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    let first = store.insert_headline("2020-03-09", "Oil prices collapse")?;
    let second = store.insert_headline("2020-03-16", "Fed cuts rates to zero")?;

    store.update_score(first, Score::new(12).unwrap()).await?;

    let pending = store.records(false).await?;
    assert_eq!(pending.len(), 1);
    assert_eq!(*pending[0].id(), second);

    let all = store.records(true).await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].score().map(|s| s.value()), Some(12));

    assert_eq!(store.counts()?, StoreCounts { total: 2, scored: 1 });
    Ok(())
}

#[tokio::test]
async fn test_update_score_is_idempotent() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    let id = store.insert_headline("2021-01-27", "GameStop shares soar")?;
    let score = Score::new(64).unwrap();

    store.update_score(id, score).await?;
    store.update_score(id, score).await?;

    let records = store.records(true).await?;
    assert_eq!(*records[0].score(), Some(score));
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_record_fails() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    let err = store.update_score(999, Score::new(50).unwrap()).await.unwrap_err();
    match err.kind() {
        AugurErrorKind::Database(db) => assert_eq!(db.kind, DatabaseErrorKind::NotFound(999)),
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_reopen_keeps_data() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("headlines.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteRecordStore::open(path)?;
        store.insert_headline("2001-09-17", "Markets reopen after attacks")?;
    }

    let store = SqliteRecordStore::open(path)?;
    assert_eq!(store.records(true).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_scraper_schema_with_text_scores_resumes_correctly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("headlines.db");
    let path = path.to_str().unwrap();

    {
        let mut conn = establish_connection(path)?;
        diesel::sql_query(
            "CREATE TABLE IF NOT EXISTS headlines \
             (id INTEGER PRIMARY KEY AUTOINCREMENT, headline TEXT, ydm DATE, output TEXT)",
        )
        .execute(&mut conn)?;
        diesel::sql_query(
            "INSERT INTO headlines (headline, ydm, output) VALUES \
             ('Lehman Brothers files for bankruptcy', '2008-09-15', '72'), \
             ('AIG receives federal rescue', '2008-09-16', NULL), \
             ('Congress rejects bailout bill', '2008-09-29', ''), \
             ('Dow posts record point drop', '2008-09-29', '150')",
        )
        .execute(&mut conn)?;
    }

    let store = SqliteRecordStore::open(path)?;
    assert_eq!(store.counts()?, StoreCounts { total: 4, scored: 1 });

    let pending: Vec<i32> = store.records(false).await?.iter().map(|r| *r.id()).collect();
    assert_eq!(pending, vec![2, 3, 4]);

    let all = store.records(true).await?;
    assert_eq!(all[0].score().map(|s| s.value()), Some(72));

    store.update_score(2, Score::new(100).unwrap()).await?;
    let pending: Vec<i32> = store.records(false).await?.iter().map(|r| *r.id()).collect();
    assert_eq!(pending, vec![3, 4]);
    assert_eq!(store.counts()?, StoreCounts { total: 4, scored: 2 });
    Ok(())
}
