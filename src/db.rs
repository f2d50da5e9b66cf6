//! SQLite pool setup shared by the engine and the table-backed storer.

use std::{str::FromStr, time::Duration};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::info;

use crate::error::BackendError;

/// Opens a pool on `database_url`, creating the database file if missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BackendError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .connect_with(connect_opts)
        .await?;

    info!(database_url, "database connected");
    Ok(pool)
}
