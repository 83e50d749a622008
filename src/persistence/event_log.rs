//! Append-only log of engine events.

use super::SqlitePersistence;
use super::models::{StoredEvent, StoredEventRow};
use crate::domain::{RaffleEvent, RaffleId};
use crate::error::EngineError;

/// Upper bound on events returned by one [`SqlitePersistence::load_events`] call.
pub const MAX_EVENT_PAGE: u32 = 500;

impl SqlitePersistence {
    /// Appends an event to the log.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn save_event(&self, event: &RaffleEvent) -> Result<i64, EngineError> {
        let raffle_id = event.raffle_id();
        let payload =
            serde_json::to_string(event).map_err(|e| EngineError::Internal(e.to_string()))?;

        sqlx::query_scalar::<_, i64>(
            "INSERT INTO engine_events (raffle_id, event_type, payload, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(raffle_id)
        .bind(event.event_type())
        .bind(&payload)
        .bind(event.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EngineError::storage("save_event", Some(raffle_id), &e))
    }

    /// Loads the most recent events of a raffle, newest first.
    ///
    /// `limit` is clamped to `1..=MAX_EVENT_PAGE`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn load_events(
        &self,
        raffle_id: RaffleId,
        limit: u32,
    ) -> Result<Vec<StoredEvent>, EngineError> {
        let rows = sqlx::query_as::<_, StoredEventRow>(
            "SELECT id, raffle_id, event_type, payload, created_at FROM engine_events \
             WHERE raffle_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(raffle_id)
        .bind(i64::from(limit.clamp(1, MAX_EVENT_PAGE)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::storage("load_events", Some(raffle_id), &e))?;

        rows.into_iter().map(StoredEvent::try_from).collect()
    }
}
