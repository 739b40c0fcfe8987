//! SQLite headline store for augur.
//!
//! Headlines live in a single `headlines(id, ydm, headline, output)` table.
//! [`SqliteRecordStore`] yields them in chronological order and writes
//! scores back into `output`. The schema is created by embedded diesel
//! migrations on open.
//!
//! # Example
//!
//! ```no_run
//! use augur_database::SqliteRecordStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteRecordStore::open("headlines.db")?;
//! let id = store.insert_headline("2008-09-15", "Lehman Brothers files for bankruptcy")?;
//! println!("inserted {id}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod store;

/// Diesel table definitions.
#[allow(missing_docs)]
pub mod schema;

pub use connection::{database_url, establish_connection, run_migrations};
pub use models::{HeadlineRow, NewHeadline, parse_ydm};
pub use store::{SqliteRecordStore, StoreCounts};

use augur_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
