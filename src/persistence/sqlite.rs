//! SQLite persistence handle and raffle queries.

use chrono::Utc;
use sqlx::SqlitePool;

use super::models::{RAFFLE_COLUMNS, RaffleRow};
use crate::domain::{Actor, NewRaffle, Raffle, RaffleId, RaffleStatus};
use crate::error::EngineError;

/// SQLite-backed persistence layer using `sqlx::SqlitePool`.
///
/// Query methods are split across this module, `participants`, `results`
/// and `event_log`; all share this handle.
#[derive(Debug, Clone)]
pub struct SqlitePersistence {
    pub(super) pool: SqlitePool,
}

impl SqlitePersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trips a trivial query to confirm the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the query fails.
    pub async fn ping(&self) -> Result<(), EngineError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| EngineError::storage("ping", None, &e))?;
        Ok(())
    }

    /// Inserts a new raffle in status `active`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn insert_raffle(&self, raffle: &NewRaffle, actor: &Actor) -> Result<Raffle, EngineError> {
        let id = RaffleId::new();
        let now = Utc::now();
        let field_config = serde_json::to_string(&raffle.fields)
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let query = format!(
            "INSERT INTO raffles \
                (id, name, description, winner_count, field_config, status, created_by, \
                 created_at, updated_at, config_updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {RAFFLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RaffleRow>(&query)
            .bind(id)
            .bind(&raffle.name)
            .bind(raffle.description.as_deref())
            .bind(i64::from(raffle.winner_count))
            .bind(&field_config)
            .bind(RaffleStatus::Active.as_str())
            .bind(actor.as_str())
            .bind(now)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngineError::storage("insert_raffle", Some(id), &e))?;

        Raffle::try_from(row)
    }

    /// Loads a raffle by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if it does not exist, or
    /// [`EngineError::Storage`] on database failure.
    pub async fn get_raffle(&self, raffle_id: RaffleId) -> Result<Raffle, EngineError> {
        let query = format!("SELECT {RAFFLE_COLUMNS} FROM raffles WHERE id = ?");
        let row = sqlx::query_as::<_, RaffleRow>(&query)
            .bind(raffle_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngineError::storage("get_raffle", Some(raffle_id), &e))?
            .ok_or(EngineError::RaffleNotFound(raffle_id))?;

        Raffle::try_from(row)
    }

    /// Lists all raffles, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn list_raffles(&self) -> Result<Vec<Raffle>, EngineError> {
        let query = format!("SELECT {RAFFLE_COLUMNS} FROM raffles ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, RaffleRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::storage("list_raffles", None, &e))?;

        rows.into_iter().map(Raffle::try_from).collect()
    }

    /// Sets a raffle's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if it does not exist, or
    /// [`EngineError::Storage`] on database failure.
    pub async fn update_status(
        &self,
        raffle_id: RaffleId,
        status: RaffleStatus,
    ) -> Result<Raffle, EngineError> {
        let query = format!(
            "UPDATE raffles SET status = ?, updated_at = ? WHERE id = ? RETURNING {RAFFLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RaffleRow>(&query)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(raffle_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngineError::storage("update_status", Some(raffle_id), &e))?
            .ok_or(EngineError::RaffleNotFound(raffle_id))?;

        Raffle::try_from(row)
    }

    /// Reconfigures a raffle's winner count and stamps `config_updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if it does not exist, or
    /// [`EngineError::Storage`] on database failure.
    pub async fn update_winner_count(
        &self,
        raffle_id: RaffleId,
        winner_count: u32,
    ) -> Result<Raffle, EngineError> {
        let now = Utc::now();
        let query = format!(
            "UPDATE raffles SET winner_count = ?, updated_at = ?, config_updated_at = ? \
             WHERE id = ? RETURNING {RAFFLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RaffleRow>(&query)
            .bind(i64::from(winner_count))
            .bind(now)
            .bind(now)
            .bind(raffle_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngineError::storage("update_winner_count", Some(raffle_id), &e))?
            .ok_or(EngineError::RaffleNotFound(raffle_id))?;

        Raffle::try_from(row)
    }
}
