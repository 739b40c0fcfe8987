//! Headline records and validated scores.

use serde::{Deserialize, Serialize};

/// Lowest score the model may assign.
pub const SCORE_MIN: i32 = 1;
/// Highest score the model may assign.
pub const SCORE_MAX: i32 = 100;

/// A market-impact score known to lie in `SCORE_MIN..=SCORE_MAX`.
///
/// The only way to obtain a `Score` is through [`Score::new`], so a persisted
/// score can never be out of range.
///
/// # Examples
///
/// ```
/// use augur_core::Score;
///
/// assert_eq!(Score::new(45).map(|s| s.value()), Some(45));
/// assert!(Score::new(0).is_none());
/// assert!(Score::new(101).is_none());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Score(i32);

impl Score {
    /// Returns the score if `value` is in range.
    pub fn new(value: i32) -> Option<Self> {
        (SCORE_MIN..=SCORE_MAX).contains(&value).then_some(Self(value))
    }

    /// The underlying integer.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Score {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Score::new(value).ok_or_else(|| format!("score {value} outside {SCORE_MIN}..={SCORE_MAX}"))
    }
}

impl From<Score> for i32 {
    fn from(score: Score) -> Self {
        score.0
    }
}

/// A stored headline awaiting (or holding) a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Record {
    /// Row identifier in the store
    id: i32,
    /// Publication year
    year: i32,
    /// Publication month (1-12)
    month: u32,
    /// Headline text
    headline: String,
    /// Score written by a previous run, if any
    score: Option<Score>,
}

impl Record {
    /// Creates a record.
    pub fn new(id: i32, year: i32, month: u32, headline: impl Into<String>, score: Option<Score>) -> Self {
        Self {
            id,
            year,
            month,
            headline: headline.into(),
            score,
        }
    }
}
