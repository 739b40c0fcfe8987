//! Database connection utilities.

use crate::DatabaseResult;
use augur_error::{DatabaseError, DatabaseErrorKind};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, instrument};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Resolve the database path: `DATABASE_URL` wins over the configured one.
pub fn database_url(configured: &str) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Open a SQLite database, creating the file if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
#[instrument]
pub fn establish_connection(database_url: &str) -> DatabaseResult<SqliteConnection> {
    debug!("Opening SQLite database");
    SqliteConnection::establish(database_url)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns [`DatabaseErrorKind::Migration`] if a migration fails.
pub fn run_migrations(conn: &mut SqliteConnection) -> DatabaseResult<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| debug!(count = applied.len(), "Applied migrations"))
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))
}
