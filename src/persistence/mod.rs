//! Persistence layer: SQLite storage for raffles, participants, draw
//! events, result rows and the engine event log.
//!
//! [`SqlitePersistence`] wraps an injected `sqlx::SqlitePool`. Every
//! multi-statement write runs inside one transaction whose first statement
//! is a write, so SQLite takes the write lock up front and a dropped future
//! rolls the whole unit back.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::config::EngineConfig;
use crate::error::EngineError;

pub mod event_log;
pub mod models;
pub mod participants;
pub mod results;
pub mod sqlite;

pub use models::StoredEvent;
pub use sqlite::SqlitePersistence;

/// Opens the configured database and applies pending migrations.
///
/// In-memory databases are pinned to a single long-lived connection, since
/// every SQLite connection to `:memory:` sees its own private database.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] if the URL is invalid, the database
/// cannot be opened, or a migration fails.
pub async fn connect(config: &EngineConfig) -> Result<SqlitePool, EngineError> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| EngineError::storage("connect", None, &e))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.database_busy_timeout_secs));

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs));

    if config.is_in_memory() {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        pool_options = pool_options
            .max_connections(config.database_max_connections.max(1))
            .min_connections(config.database_min_connections);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| EngineError::storage("connect", None, &e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| EngineError::storage("migrate", None, &e))?;

    tracing::info!(url = %config.database_url, "database ready");
    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] if SQLite cannot be initialized.
pub async fn connect_in_memory() -> Result<SqlitePool, EngineError> {
    connect(&EngineConfig::in_memory()).await
}
