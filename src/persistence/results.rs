//! Result committer, draw history, reversal and integrity snapshots.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::SqlitePersistence;
use super::models::{AuditRecord, DRAW_EVENT_COLUMNS, DrawEventRow, ResultRow};
use crate::domain::draw::check_winner_list;
use crate::domain::integrity::AuditRow;
use crate::domain::{
    CommittedDraw, DrawEvent, DrawEventId, DrawMeta, ParticipantId, RaffleId, Winner,
};
use crate::error::EngineError;

impl SqlitePersistence {
    /// Atomically persists `winners` as one new draw event.
    ///
    /// Within a single transaction the event row is written first, then every
    /// proposed winner is re-validated: it must still be an active
    /// participant of this raffle and hold no result row. If any winner
    /// fails, nothing is written.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRequest`] for an empty or non-dense list.
    /// - [`EngineError::StaleSelection`] when a winner is no longer eligible.
    /// - [`EngineError::Storage`] on database failure.
    pub async fn commit_draw(
        &self,
        raffle_id: RaffleId,
        winners: &[Winner],
        meta: &DrawMeta,
    ) -> Result<CommittedDraw, EngineError> {
        check_winner_list(winners)?;
        let storage = |e: sqlx::Error| EngineError::storage("commit_draw", Some(raffle_id), &e);

        let event = DrawEvent {
            id: DrawEventId::new(),
            raffle_id,
            requested_count: meta.requested_count,
            winner_count: u32::try_from(winners.len())
                .map_err(|_| EngineError::InvalidRequest("too many winners".to_string()))?,
            notes: meta.notes.clone(),
            drawn_by: meta.actor.as_str().to_string(),
            drawn_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(
            "INSERT INTO draw_events \
                (id, raffle_id, requested_count, winner_count, notes, drawn_by, drawn_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id)
        .bind(raffle_id)
        .bind(i64::from(event.requested_count))
        .bind(i64::from(event.winner_count))
        .bind(event.notes.as_deref())
        .bind(&event.drawn_by)
        .bind(event.drawn_at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        let mut owned = QueryBuilder::<Sqlite>::new(
            "SELECT id FROM participants WHERE active = 1 AND raffle_id = ",
        );
        owned.push_bind(raffle_id);
        push_id_list(&mut owned, " AND id IN (", winners);
        let still_active: HashSet<ParticipantId> = owned
            .build_query_scalar::<ParticipantId>()
            .fetch_all(&mut *tx)
            .await
            .map_err(storage)?
            .into_iter()
            .collect();

        let mut taken = QueryBuilder::<Sqlite>::new(
            "SELECT participant_id FROM results WHERE raffle_id = ",
        );
        taken.push_bind(raffle_id);
        push_id_list(&mut taken, " AND participant_id IN (", winners);
        let already_won: HashSet<ParticipantId> = taken
            .build_query_scalar::<ParticipantId>()
            .fetch_all(&mut *tx)
            .await
            .map_err(storage)?
            .into_iter()
            .collect();

        let stale: Vec<ParticipantId> = winners
            .iter()
            .map(|w| w.participant_id)
            .filter(|id| !still_active.contains(id) || already_won.contains(id))
            .collect();
        if !stale.is_empty() {
            tracing::warn!(%raffle_id, stale = stale.len(), "rejecting stale draw selection");
            return Err(EngineError::StaleSelection { participants: stale });
        }

        let mut ordered = winners.to_vec();
        ordered.sort_by_key(|w| w.position);
        for winner in &ordered {
            let inserted = sqlx::query(
                "INSERT INTO results (raffle_id, participant_id, position, draw_event_id) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(raffle_id)
            .bind(winner.participant_id)
            .bind(i64::from(winner.position))
            .bind(event.id)
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => {}
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    return Err(EngineError::StaleSelection {
                        participants: vec![winner.participant_id],
                    });
                }
                Err(e) => return Err(storage(e)),
            }
        }

        tx.commit().await.map_err(storage)?;

        tracing::info!(
            %raffle_id,
            draw_event_id = %event.id,
            winners = ordered.len(),
            actor = %meta.actor,
            "draw committed"
        );
        Ok(CommittedDraw {
            event,
            winners: ordered,
        })
    }

    /// Lists a raffle's draw events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn list_draw_events(&self, raffle_id: RaffleId) -> Result<Vec<DrawEvent>, EngineError> {
        let query = format!(
            "SELECT {DRAW_EVENT_COLUMNS} FROM draw_events \
             WHERE raffle_id = ? ORDER BY drawn_at, rowid"
        );
        let rows = sqlx::query_as::<_, DrawEventRow>(&query)
            .bind(raffle_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::storage("list_draw_events", Some(raffle_id), &e))?;

        rows.into_iter().map(DrawEvent::try_from).collect()
    }

    /// Lists every draw event of a raffle with its winners by position.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn list_draws(&self, raffle_id: RaffleId) -> Result<Vec<CommittedDraw>, EngineError> {
        let events = self.list_draw_events(raffle_id).await?;
        let rows = sqlx::query_as::<_, ResultRow>(
            "SELECT participant_id, position, draw_event_id FROM results \
             WHERE raffle_id = ? ORDER BY position",
        )
        .bind(raffle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::storage("list_draws", Some(raffle_id), &e))?;

        let mut by_event: BTreeMap<DrawEventId, Vec<Winner>> = BTreeMap::new();
        for row in &rows {
            by_event
                .entry(row.draw_event_id)
                .or_default()
                .push(Winner::try_from(row)?);
        }

        Ok(events
            .into_iter()
            .map(|event| {
                let winners = by_event.remove(&event.id).unwrap_or_default();
                CommittedDraw { event, winners }
            })
            .collect())
    }

    /// Deletes every result row of one draw event, and the event itself,
    /// in one transaction. Participants are never touched.
    ///
    /// Returns the released winners by position.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EventNotFound`] if no result rows of the raffle
    /// carry `draw_event_id`, or [`EngineError::Storage`] on failure.
    pub async fn delete_draw_event(
        &self,
        raffle_id: RaffleId,
        draw_event_id: DrawEventId,
    ) -> Result<Vec<Winner>, EngineError> {
        let storage =
            |e: sqlx::Error| EngineError::storage("reverse_draw_event", Some(raffle_id), &e);

        let mut tx = self.pool.begin().await.map_err(storage)?;

        let removed = sqlx::query_as::<_, ResultRow>(
            "DELETE FROM results WHERE raffle_id = ? AND draw_event_id = ? \
             RETURNING participant_id, position, draw_event_id",
        )
        .bind(raffle_id)
        .bind(draw_event_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(storage)?;

        if removed.is_empty() {
            return Err(EngineError::EventNotFound(draw_event_id));
        }

        sqlx::query("DELETE FROM draw_events WHERE id = ? AND raffle_id = ?")
            .bind(draw_event_id)
            .bind(raffle_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        let mut released = removed
            .iter()
            .map(Winner::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        released.sort_by_key(|w| w.position);
        Ok(released)
    }

    /// Loads every result row of a raffle joined with the owning raffle of
    /// its participant, for auditing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn audit_rows(&self, raffle_id: RaffleId) -> Result<Vec<AuditRow>, EngineError> {
        let records = sqlx::query_as::<_, AuditRecord>(
            "SELECT r.id AS result_id, r.participant_id, r.position, r.draw_event_id, \
                    p.raffle_id AS participant_raffle_id \
             FROM results r \
             LEFT JOIN participants p ON p.id = r.participant_id \
             WHERE r.raffle_id = ? \
             ORDER BY r.draw_event_id, r.position",
        )
        .bind(raffle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::storage("validate_integrity", Some(raffle_id), &e))?;

        Ok(records.into_iter().map(AuditRow::from).collect())
    }
}

fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, prefix: &str, winners: &[Winner]) {
    builder.push(prefix);
    let mut ids = builder.separated(", ");
    for winner in winners {
        ids.push_bind(winner.participant_id);
    }
    ids.push_unseparated(")");
}
