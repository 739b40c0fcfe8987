//! Row types for the `headlines` table.

use crate::DatabaseResult;
use crate::schema::headlines;
use augur_core::{Record, Score};
use augur_error::{DatabaseError, DatabaseErrorKind};
use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;
use tracing::warn;

/// A stored headline.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = headlines)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HeadlineRow {
    /// Row identifier
    pub id: i32,
    /// Publication date, `YYYY-MM-DD` optionally followed by a time
    pub ydm: String,
    /// Headline text
    pub headline: String,
    /// Score, once one has been assigned
    pub output: Option<i32>,
}

/// New headline for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = headlines)]
pub struct NewHeadline<'a> {
    /// Publication date, `YYYY-MM-DD`
    pub ydm: &'a str,
    /// Headline text
    pub headline: &'a str,
}

impl HeadlineRow {
    /// Convert to a domain record.
    ///
    /// A stored score outside the valid range is reported as unscored.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseErrorKind::InvalidDate`] if `ydm` does not start
    /// with a `YYYY-MM-DD` date.
    pub fn into_record(self) -> DatabaseResult<Record> {
        let date = parse_ydm(&self.ydm).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::InvalidDate {
                id: self.id,
                value: self.ydm.clone(),
            })
        })?;

        let score = self.output.and_then(|value| {
            let score = Score::new(value);
            if score.is_none() {
                warn!(record_id = self.id, value, "Ignoring out of range stored score");
            }
            score
        });

        Ok(Record::new(self.id, date.year(), date.month(), self.headline, score))
    }
}

/// Parse the date part of a `ydm` column value.
pub fn parse_ydm(ydm: &str) -> Option<NaiveDate> {
    let date = ydm.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
