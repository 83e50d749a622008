//! Domain events reflecting raffle state mutations.
//!
//! Every committed mutation emits a [`RaffleEvent`] through the
//! [`super::EventBus`]. Collaborators outside the engine (mailers, report
//! builders) subscribe to react, and the event recorder persists them to the
//! `engine_events` log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DrawEventId, ParticipantId, RaffleId, RaffleStatus, Winner};

/// Domain event emitted after every committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RaffleEvent {
    /// Emitted when a raffle is created.
    RaffleCreated {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Display name.
        name: String,
        /// Configured winner count.
        winner_count: u32,
        /// Creating administrator.
        actor: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an administrator changes status or winner count.
    RaffleUpdated {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Status after the change.
        status: RaffleStatus,
        /// Winner count after the change.
        winner_count: u32,
        /// Acting administrator.
        actor: String,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a registration is admitted.
    ParticipantAdmitted {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// New participant.
        participant_id: ParticipantId,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an administrator deactivates a participant.
    ParticipantDeactivated {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Deactivated participant.
        participant_id: ParticipantId,
        /// Acting administrator.
        actor: String,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a draw event is committed.
    DrawCommitted {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Committed event.
        draw_event_id: DrawEventId,
        /// Winners by position.
        winners: Vec<Winner>,
        /// Executing administrator.
        actor: String,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a draw event is reversed.
    DrawReversed {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Reversed event.
        draw_event_id: DrawEventId,
        /// Winners released back into the pool.
        released: Vec<Winner>,
        /// Acting administrator.
        actor: String,
        /// Reversal timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl RaffleEvent {
    /// Returns the raffle this event concerns.
    #[must_use]
    pub const fn raffle_id(&self) -> RaffleId {
        match self {
            Self::RaffleCreated { raffle_id, .. }
            | Self::RaffleUpdated { raffle_id, .. }
            | Self::ParticipantAdmitted { raffle_id, .. }
            | Self::ParticipantDeactivated { raffle_id, .. }
            | Self::DrawCommitted { raffle_id, .. }
            | Self::DrawReversed { raffle_id, .. } => *raffle_id,
        }
    }

    /// Returns the snake_case event type discriminator.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::RaffleCreated { .. } => "raffle_created",
            Self::RaffleUpdated { .. } => "raffle_updated",
            Self::ParticipantAdmitted { .. } => "participant_admitted",
            Self::ParticipantDeactivated { .. } => "participant_deactivated",
            Self::DrawCommitted { .. } => "draw_committed",
            Self::DrawReversed { .. } => "draw_reversed",
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RaffleCreated { timestamp, .. }
            | Self::RaffleUpdated { timestamp, .. }
            | Self::ParticipantAdmitted { timestamp, .. }
            | Self::ParticipantDeactivated { timestamp, .. }
            | Self::DrawCommitted { timestamp, .. }
            | Self::DrawReversed { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_type_tag() {
        let raffle_id = RaffleId::new();
        let event = RaffleEvent::ParticipantAdmitted {
            raffle_id,
            participant_id: ParticipantId::new(),
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_value(&event) else {
            panic!("serialization failed");
        };
        assert_eq!(json["event_type"], event.event_type());
        assert_eq!(json["raffle_id"], raffle_id.to_string());
        assert_eq!(event.raffle_id(), raffle_id);
    }
}
