//! Raffle service: orchestrates admission, draws, auditing and reversal.

use chrono::Utc;

use super::selector::select_winners;
use crate::domain::integrity::audit;
use crate::domain::raffle::validate_winner_count;
use crate::domain::{
    Actor, CommittedDraw, DrawEventId, DrawLocks, DrawMeta, DrawRequest, EventBus,
    IntegrityReport, NewParticipant, NewRaffle, ParticipantId, ParticipantPage, REVERSAL_CONFIRMATION,
    Raffle, RaffleEvent, RaffleId, RaffleStatus, RegistrationForm, ReversalOutcome,
};
use crate::error::EngineError;
use crate::persistence::{SqlitePersistence, StoredEvent};

/// Orchestration layer for every engine operation.
///
/// Holds the injected [`SqlitePersistence`], the per-raffle [`DrawLocks`]
/// and the [`EventBus`]. Draw execution and reversal follow the pattern:
/// take the raffle's draw lock → read state → decide → commit in one
/// transaction → emit event → release lock.
#[derive(Debug, Clone)]
pub struct RaffleService {
    store: SqlitePersistence,
    draw_locks: DrawLocks,
    event_bus: EventBus,
}

impl RaffleService {
    /// Creates a new `RaffleService`.
    #[must_use]
    pub fn new(store: SqlitePersistence, event_bus: EventBus) -> Self {
        Self {
            store,
            draw_locks: DrawLocks::new(),
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the persistence layer.
    #[must_use]
    pub fn store(&self) -> &SqlitePersistence {
        &self.store
    }

    // ── Raffle administration ───────────────────────────────────────────

    /// Creates a raffle in status `active`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn create_raffle(&self, actor: &Actor, raffle: NewRaffle) -> Result<Raffle, EngineError> {
        let raffle = self.store.insert_raffle(&raffle, actor).await?;

        let _ = self.event_bus.publish(RaffleEvent::RaffleCreated {
            raffle_id: raffle.id,
            name: raffle.name.clone(),
            winner_count: raffle.winner_count,
            actor: actor.to_string(),
            timestamp: raffle.created_at,
        });

        tracing::info!(raffle_id = %raffle.id, %actor, winner_count = raffle.winner_count, "raffle created");
        Ok(raffle)
    }

    /// Loads a raffle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if it does not exist.
    pub async fn get_raffle(&self, raffle_id: RaffleId) -> Result<Raffle, EngineError> {
        self.store.get_raffle(raffle_id).await
    }

    /// Lists all raffles, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on database failure.
    pub async fn list_raffles(&self) -> Result<Vec<Raffle>, EngineError> {
        self.store.list_raffles().await
    }

    /// Moves a raffle to `status`. Setting the current status is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] when leaving `finished`, or
    /// [`EngineError::RaffleNotFound`] if the raffle does not exist.
    pub async fn set_status(
        &self,
        actor: &Actor,
        raffle_id: RaffleId,
        status: RaffleStatus,
    ) -> Result<Raffle, EngineError> {
        let current = self.store.get_raffle(raffle_id).await?;
        current.status.check_transition(status)?;
        if current.status == status {
            return Ok(current);
        }

        let raffle = self.store.update_status(raffle_id, status).await?;
        self.publish_update(actor, &raffle);
        tracing::info!(%raffle_id, %actor, from = %current.status, to = %status, "raffle status changed");
        Ok(raffle)
    }

    /// Reconfigures the winner count of a raffle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for an out-of-range count,
    /// [`EngineError::RaffleClosed`] for a finished raffle, or
    /// [`EngineError::RaffleNotFound`].
    pub async fn set_winner_count(
        &self,
        actor: &Actor,
        raffle_id: RaffleId,
        winner_count: u32,
    ) -> Result<Raffle, EngineError> {
        validate_winner_count(winner_count)?;
        let current = self.store.get_raffle(raffle_id).await?;
        if current.status == RaffleStatus::Finished {
            return Err(EngineError::RaffleClosed {
                raffle_id,
                status: current.status,
            });
        }

        let raffle = self.store.update_winner_count(raffle_id, winner_count).await?;
        self.publish_update(actor, &raffle);
        tracing::info!(
            %raffle_id,
            %actor,
            from = current.winner_count,
            to = winner_count,
            "raffle winner count changed"
        );
        Ok(raffle)
    }

    // ── Participants ────────────────────────────────────────────────────

    /// Validates a registration and admits it unless it duplicates an
    /// active participant of the same raffle.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RaffleNotFound`] / [`EngineError::RaffleClosed`].
    /// - [`EngineError::Validation`] for missing or malformed fields.
    /// - [`EngineError::DuplicateParticipant`] when already registered.
    pub async fn admit_participant(
        &self,
        raffle_id: RaffleId,
        form: RegistrationForm,
    ) -> Result<ParticipantId, EngineError> {
        let raffle = self.store.get_raffle(raffle_id).await?;
        if !raffle.status.accepts_registrations() {
            return Err(EngineError::RaffleClosed {
                raffle_id,
                status: raffle.status,
            });
        }

        let candidate = NewParticipant::validate(&raffle, form)?;
        let participant = match self.store.insert_participant(&candidate).await {
            Ok(participant) => participant,
            Err(err @ EngineError::DuplicateParticipant { .. }) => {
                tracing::info!(%raffle_id, "duplicate registration rejected");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let _ = self.event_bus.publish(RaffleEvent::ParticipantAdmitted {
            raffle_id,
            participant_id: participant.id,
            timestamp: participant.created_at,
        });

        tracing::debug!(%raffle_id, participant_id = %participant.id, "participant admitted");
        Ok(participant.id)
    }

    /// Lists one page of a raffle's participants, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
    pub async fn list_participants(
        &self,
        raffle_id: RaffleId,
        limit: u32,
        offset: u64,
    ) -> Result<ParticipantPage, EngineError> {
        self.store.get_raffle(raffle_id).await?;
        self.store.list_participants(raffle_id, limit, offset).await
    }

    /// Marks a participant inactive, removing it from future draws.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ParticipantNotFound`] if the participant is not
    /// part of the raffle.
    pub async fn deactivate_participant(
        &self,
        actor: &Actor,
        raffle_id: RaffleId,
        participant_id: ParticipantId,
    ) -> Result<(), EngineError> {
        self.store
            .deactivate_participant(raffle_id, participant_id)
            .await?;

        let _ = self.event_bus.publish(RaffleEvent::ParticipantDeactivated {
            raffle_id,
            participant_id,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%raffle_id, %participant_id, %actor, "participant deactivated");
        Ok(())
    }

    /// Returns the participants that may still be drawn: active and without
    /// a result row in this raffle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
    pub async fn resolve_eligible(&self, raffle_id: RaffleId) -> Result<Vec<ParticipantId>, EngineError> {
        self.store.get_raffle(raffle_id).await?;
        self.store.eligible_participants(raffle_id).await
    }

    // ── Draws ───────────────────────────────────────────────────────────

    /// Draws winners from the eligible pool and commits them as one event.
    ///
    /// The raffle's draw lock is held from eligibility resolution through
    /// commit. The count defaults to the raffle's configured winner count;
    /// a larger request is capped at that count, and the result is clamped
    /// to the eligible pool.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RaffleNotFound`] if the raffle does not exist.
    /// - [`EngineError::DrawInProgress`] if another draw or reversal holds
    ///   the raffle's lock.
    /// - [`EngineError::RaffleClosed`] for a finished raffle.
    /// - [`EngineError::InsufficientParticipants`] for an empty pool.
    /// - [`EngineError::StaleSelection`] if eligibility changed before commit.
    pub async fn execute_draw(
        &self,
        actor: &Actor,
        raffle_id: RaffleId,
        request: DrawRequest,
    ) -> Result<CommittedDraw, EngineError> {
        let request = request.normalized()?;
        self.store.get_raffle(raffle_id).await?;
        let permit = self.draw_locks.try_acquire(raffle_id).inspect_err(|_| {
            tracing::warn!(%raffle_id, %actor, "draw rejected: another draw in progress");
        })?;

        let raffle = self.store.get_raffle(raffle_id).await?;
        if !raffle.status.accepts_draws() {
            return Err(EngineError::RaffleClosed {
                raffle_id,
                status: raffle.status,
            });
        }
        let requested = request.count.unwrap_or(raffle.winner_count);
        let allowed = requested.min(raffle.winner_count);

        let pool = self.store.eligible_participants(raffle_id).await?;
        let winners = select_winners(raffle_id, &pool, allowed, &mut rand::rng())?;
        tracing::debug!(
            %raffle_id,
            eligible = pool.len(),
            requested,
            allowed,
            selected = winners.len(),
            "winners selected"
        );

        let meta = DrawMeta {
            requested_count: requested,
            notes: request.notes,
            actor: actor.clone(),
        };
        let committed = self.store.commit_draw(raffle_id, &winners, &meta).await?;
        drop(permit);

        let _ = self.event_bus.publish(RaffleEvent::DrawCommitted {
            raffle_id,
            draw_event_id: committed.event.id,
            winners: committed.winners.clone(),
            actor: actor.to_string(),
            timestamp: committed.event.drawn_at,
        });

        Ok(committed)
    }

    /// Lists every draw event of a raffle with its winners.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
    pub async fn list_draws(&self, raffle_id: RaffleId) -> Result<Vec<CommittedDraw>, EngineError> {
        self.store.get_raffle(raffle_id).await?;
        self.store.list_draws(raffle_id).await
    }

    /// Audits stored results of a raffle, or of one of its draw events.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
    /// Findings are returned in the report, never as errors.
    pub async fn validate_integrity(
        &self,
        raffle_id: RaffleId,
        draw_event_id: Option<DrawEventId>,
    ) -> Result<IntegrityReport, EngineError> {
        let raffle = self.store.get_raffle(raffle_id).await?;
        let events = self.store.list_draw_events(raffle_id).await?;
        let rows = self.store.audit_rows(raffle_id).await?;

        let report = audit(&raffle, &events, &rows, draw_event_id);
        if !report.valid {
            tracing::warn!(%raffle_id, issues = report.issues.len(), "integrity check found errors");
        }
        Ok(report)
    }

    /// Reverses one draw event: deletes all its result rows and the event,
    /// making its winners eligible again.
    ///
    /// # Errors
    ///
    /// - [`EngineError::BadConfirmation`] unless `confirmation` equals
    ///   [`REVERSAL_CONFIRMATION`].
    /// - [`EngineError::RaffleNotFound`] if the raffle does not exist.
    /// - [`EngineError::DrawInProgress`] if a draw holds the raffle's lock.
    /// - [`EngineError::EventNotFound`] if the event has no rows in the raffle.
    pub async fn reverse_draw_event(
        &self,
        actor: &Actor,
        raffle_id: RaffleId,
        draw_event_id: DrawEventId,
        confirmation: &str,
    ) -> Result<ReversalOutcome, EngineError> {
        if confirmation != REVERSAL_CONFIRMATION {
            tracing::warn!(%raffle_id, %draw_event_id, %actor, "reversal rejected: bad confirmation");
            return Err(EngineError::BadConfirmation);
        }

        self.store.get_raffle(raffle_id).await?;
        let permit = self.draw_locks.try_acquire(raffle_id)?;
        let released = self.store.delete_draw_event(raffle_id, draw_event_id).await?;
        drop(permit);

        let _ = self.event_bus.publish(RaffleEvent::DrawReversed {
            raffle_id,
            draw_event_id,
            released: released.clone(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            %raffle_id,
            %draw_event_id,
            %actor,
            released = released.len(),
            "draw event reversed"
        );
        Ok(ReversalOutcome {
            raffle_id,
            draw_event_id,
            released,
        })
    }

    // ── Event log ───────────────────────────────────────────────────────

    /// Returns the most recent logged events of a raffle, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
    pub async fn raffle_events(
        &self,
        raffle_id: RaffleId,
        limit: u32,
    ) -> Result<Vec<StoredEvent>, EngineError> {
        self.store.get_raffle(raffle_id).await?;
        self.store.load_events(raffle_id, limit).await
    }

    fn publish_update(&self, actor: &Actor, raffle: &Raffle) {
        let _ = self.event_bus.publish(RaffleEvent::RaffleUpdated {
            raffle_id: raffle.id,
            status: raffle.status,
            winner_count: raffle.winner_count,
            actor: actor.to_string(),
            timestamp: raffle.updated_at,
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::FieldConfig;
    use crate::persistence::connect_in_memory;

    async fn service() -> RaffleService {
        let Ok(pool) = connect_in_memory().await else {
            panic!("in-memory database");
        };
        RaffleService::new(SqlitePersistence::new(pool), EventBus::new(16))
    }

    fn operator() -> Actor {
        let Ok(actor) = Actor::new("ops@example.org") else {
            panic!("valid actor");
        };
        actor
    }

    #[tokio::test]
    async fn unknown_raffle_leaves_no_lock_entry() {
        let svc = service().await;
        let who = operator();

        for _ in 0..100 {
            let missing = RaffleId::new();
            let draw = svc.execute_draw(&who, missing, DrawRequest::default()).await;
            assert!(matches!(draw, Err(EngineError::RaffleNotFound(id)) if id == missing));

            let reversal = svc
                .reverse_draw_event(&who, missing, DrawEventId::new(), REVERSAL_CONFIRMATION)
                .await;
            assert!(matches!(reversal, Err(EngineError::RaffleNotFound(_))));
        }
        assert_eq!(svc.draw_locks.held_count(), 0);
    }

    #[tokio::test]
    async fn held_permit_blocks_draw_and_reversal() {
        let svc = service().await;
        let who = operator();
        let Ok(new) = NewRaffle::new("Lock check", None, 1, FieldConfig::default()) else {
            panic!("valid raffle");
        };
        let Ok(raffle) = svc.create_raffle(&who, new).await else {
            panic!("raffle created");
        };
        let form = RegistrationForm {
            name: "Ana Lopez".to_string(),
            phone: Some("1155550001".to_string()),
            ..RegistrationForm::default()
        };
        assert!(svc.admit_participant(raffle.id, form).await.is_ok());

        let Ok(permit) = svc.draw_locks.try_acquire(raffle.id) else {
            panic!("lock should be free");
        };
        let draw = svc.execute_draw(&who, raffle.id, DrawRequest::default()).await;
        assert!(matches!(draw, Err(EngineError::DrawInProgress(id)) if id == raffle.id));
        let reversal = svc
            .reverse_draw_event(&who, raffle.id, DrawEventId::new(), REVERSAL_CONFIRMATION)
            .await;
        assert!(matches!(reversal, Err(EngineError::DrawInProgress(_))));
        drop(permit);

        assert!(svc.execute_draw(&who, raffle.id, DrawRequest::default()).await.is_ok());
        assert_eq!(svc.draw_locks.held_count(), 0);
    }
}
