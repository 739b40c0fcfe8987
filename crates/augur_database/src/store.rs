//! SQLite-backed [`RecordStore`].

use crate::schema::headlines::dsl;
use crate::{DatabaseResult, HeadlineRow, NewHeadline, establish_connection, run_migrations};
use async_trait::async_trait;
use augur_core::{Record, SCORE_MAX, SCORE_MIN, Score};
use augur_error::{AugurResult, DatabaseError, DatabaseErrorKind};
use augur_interface::RecordStore;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

/// Counts of stored headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// All headlines
    pub total: i64,
    /// Headlines holding a valid score
    pub scored: i64,
}

/// Headline store over a single SQLite connection.
///
/// The connection sits behind a mutex; every operation is a short
/// statement, so callers never hold it across an await point.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore").finish_non_exhaustive()
    }
}

impl SqliteRecordStore {
    /// Open the database at `database_url` and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    #[instrument]
    pub fn open(database_url: &str) -> DatabaseResult<Self> {
        let mut conn = establish_connection(database_url)?;
        run_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already migrated connection.
    pub fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> DatabaseResult<MutexGuard<'_, SqliteConnection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::new(DatabaseErrorKind::Poisoned))
    }

    /// Insert a headline and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_headline(&self, ydm: &str, headline: &str) -> DatabaseResult<i32> {
        let mut conn = self.lock()?;
        conn.transaction(|conn| {
            diesel::insert_into(dsl::headlines)
                .values(&NewHeadline { ydm, headline })
                .execute(conn)?;
            let id = diesel::select(diesel::dsl::sql::<BigInt>("last_insert_rowid()"))
                .get_result::<i64>(conn)?;
            i32::try_from(id).map_err(|_| {
                DatabaseError::new(DatabaseErrorKind::Query(format!("Row id {} exceeds i32", id)))
            })
        })
    }

    /// Load the stored rows in chronological order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn rows(&self, include_scored: bool) -> DatabaseResult<Vec<HeadlineRow>> {
        let mut conn = self.lock()?;
        let mut query = dsl::headlines.select(HeadlineRow::as_select()).into_boxed();
        if !include_scored {
            query = query.filter(
                dsl::output
                    .is_null()
                    .or(dsl::output.lt(SCORE_MIN))
                    .or(dsl::output.gt(SCORE_MAX)),
            );
        }
        Ok(query
            .order((dsl::ydm.asc(), dsl::id.asc()))
            .load(&mut *conn)?)
    }

    /// Count all and scored headlines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn counts(&self) -> DatabaseResult<StoreCounts> {
        let mut conn = self.lock()?;
        let total = dsl::headlines.count().get_result(&mut *conn)?;
        let scored = dsl::headlines
            .filter(dsl::output.between(SCORE_MIN, SCORE_MAX))
            .count()
            .get_result(&mut *conn)?;
        Ok(StoreCounts { total, scored })
    }

    /// Write `score` to headline `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseErrorKind::NotFound`] if no such headline exists.
    pub fn write_score(&self, id: i32, score: Score) -> DatabaseResult<()> {
        let mut conn = self.lock()?;
        let updated = diesel::update(dsl::headlines.find(id))
            .set(dsl::output.eq(Some(score.value())))
            .execute(&mut *conn)?;
        if updated == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound(id)));
        }
        debug!(record_id = id, score = score.value(), "Stored score");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn records(&self, include_scored: bool) -> AugurResult<Vec<Record>> {
        let records = self
            .rows(include_scored)?
            .into_iter()
            .map(HeadlineRow::into_record)
            .collect::<DatabaseResult<Vec<_>>>()?;
        debug!(count = records.len(), include_scored, "Loaded records");
        Ok(records)
    }

    async fn update_score(&self, id: i32, score: Score) -> AugurResult<()> {
        Ok(self.write_score(id, score)?)
    }
}
