//! Participant store: deduplicated insert, listing, deactivation and the
//! eligible-pool query.

use chrono::Utc;

use super::SqlitePersistence;
use super::models::{PARTICIPANT_COLUMNS, ParticipantRow};
use crate::domain::{NewParticipant, Participant, ParticipantId, ParticipantPage, RaffleId};
use crate::error::EngineError;

impl SqlitePersistence {
    /// Inserts a participant unless an active one with the same identity key
    /// already exists in the raffle.
    ///
    /// The existence check and the insert are one conditional statement, and
    /// the partial unique index on `(raffle_id, identity_key)` backs it up, so
    /// two concurrent identical registrations cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateParticipant`] when the identity is
    /// taken, or [`EngineError::Storage`] on database failure.
    pub async fn insert_participant(
        &self,
        participant: &NewParticipant,
    ) -> Result<Participant, EngineError> {
        let raffle_id = participant.raffle_id;
        let id = ParticipantId::new();
        let now = Utc::now();
        let identity_key = participant.identity.as_db_key();
        let extra_fields = serde_json::to_string(&participant.extra)
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| EngineError::storage("admit_participant", Some(raffle_id), &e))?;

        let inserted = sqlx::query(
            "INSERT INTO participants \
                (id, raffle_id, name, phone, national_id, email, extra_fields, identity_key, \
                 active, created_at) \
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, 1, ? \
             WHERE NOT EXISTS ( \
                SELECT 1 FROM participants \
                WHERE raffle_id = ? AND identity_key = ? AND active = 1)",
        )
        .bind(id)
        .bind(raffle_id)
        .bind(&participant.name)
        .bind(participant.phone.as_deref())
        .bind(participant.national_id.as_deref())
        .bind(participant.email.as_deref())
        .bind(&extra_fields)
        .bind(&identity_key)
        .bind(now)
        .bind(raffle_id)
        .bind(&identity_key)
        .execute(&mut *tx)
        .await;

        let rows_affected = match inserted {
            Ok(result) => result.rows_affected(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => 0,
            Err(e) => return Err(EngineError::storage("admit_participant", Some(raffle_id), &e)),
        };
        if rows_affected == 0 {
            return Err(EngineError::DuplicateParticipant {
                message: participant.identity.duplicate_message(),
            });
        }

        tx.commit()
            .await
            .map_err(|e| EngineError::storage("admit_participant", Some(raffle_id), &e))?;

        Ok(Participant {
            id,
            raffle_id,
            name: participant.name.clone(),
            phone: participant.phone.clone(),
            national_id: participant.national_id.clone(),
            email: participant.email.clone(),
            extra: participant.extra.clone(),
            active: true,
            created_at: now,
        })
    }

    /// Returns up to `limit` participants of a raffle starting at `offset`,
    /// in registration order, with the raffle's total participant count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn list_participants(
        &self,
        raffle_id: RaffleId,
        limit: u32,
        offset: u64,
    ) -> Result<ParticipantPage, EngineError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE raffle_id = ?")
            .bind(raffle_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngineError::storage("count_participants", Some(raffle_id), &e))?;

        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE raffle_id = ? ORDER BY created_at, rowid LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, ParticipantRow>(&query)
            .bind(raffle_id)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::storage("list_participants", Some(raffle_id), &e))?;

        Ok(ParticipantPage {
            participants: rows
                .into_iter()
                .map(Participant::try_from)
                .collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    /// Marks a participant inactive. Result rows it already holds are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ParticipantNotFound`] if the participant does
    /// not belong to the raffle, or [`EngineError::Storage`] on failure.
    pub async fn deactivate_participant(
        &self,
        raffle_id: RaffleId,
        participant_id: ParticipantId,
    ) -> Result<(), EngineError> {
        let result =
            sqlx::query("UPDATE participants SET active = 0 WHERE id = ? AND raffle_id = ?")
                .bind(participant_id)
                .bind(raffle_id)
                .execute(&self.pool)
                .await
                .map_err(|e| EngineError::storage("deactivate_participant", Some(raffle_id), &e))?;

        if result.rows_affected() == 0 {
            return Err(EngineError::ParticipantNotFound(participant_id));
        }
        Ok(())
    }

    /// Returns active participants without a result row in the raffle,
    /// in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn eligible_participants(
        &self,
        raffle_id: RaffleId,
    ) -> Result<Vec<ParticipantId>, EngineError> {
        sqlx::query_scalar::<_, ParticipantId>(
            "SELECT p.id FROM participants p \
             WHERE p.raffle_id = ? AND p.active = 1 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM results r \
                   WHERE r.raffle_id = p.raffle_id AND r.participant_id = p.id) \
             ORDER BY p.created_at, p.rowid",
        )
        .bind(raffle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::storage("resolve_eligible", Some(raffle_id), &e))
    }
}
