//! Database row models and their conversion into domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::integrity::AuditRow;
use crate::domain::{
    DrawEvent, DrawEventId, Participant, ParticipantId, Raffle, RaffleId, Winner,
};
use crate::error::EngineError;

/// Column list for `raffles` queries.
pub(crate) const RAFFLE_COLUMNS: &str = "id, name, description, winner_count, field_config, \
    status, created_by, created_at, updated_at, config_updated_at";

/// Column list for `participants` queries.
pub(crate) const PARTICIPANT_COLUMNS: &str =
    "id, raffle_id, name, phone, national_id, email, extra_fields, active, created_at";

/// Column list for `draw_events` queries.
pub(crate) const DRAW_EVENT_COLUMNS: &str =
    "id, raffle_id, requested_count, winner_count, notes, drawn_by, drawn_at";

/// A row from the `raffles` table.
#[derive(Debug, sqlx::FromRow)]
pub struct RaffleRow {
    /// Raffle identifier.
    pub id: RaffleId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Configured winner count.
    pub winner_count: i64,
    /// JSON-encoded [`crate::domain::FieldConfig`].
    pub field_config: String,
    /// Status string.
    pub status: String,
    /// Creating administrator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last winner-count change.
    pub config_updated_at: DateTime<Utc>,
}

impl TryFrom<RaffleRow> for Raffle {
    type Error = EngineError;

    fn try_from(row: RaffleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            winner_count: to_u32("raffles.winner_count", row.winner_count)?,
            fields: serde_json::from_str(&row.field_config).map_err(|e| {
                EngineError::Internal(format!("corrupt field_config for raffle {}: {e}", row.id))
            })?,
            status: row.status.parse()?,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            config_updated_at: row.config_updated_at,
        })
    }
}

/// A row from the `participants` table.
#[derive(Debug, sqlx::FromRow)]
pub struct ParticipantRow {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Owning raffle.
    pub raffle_id: RaffleId,
    /// Name.
    pub name: String,
    /// Phone.
    pub phone: Option<String>,
    /// National id.
    pub national_id: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// JSON object of extra fields.
    pub extra_fields: String,
    /// Active flag.
    pub active: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = EngineError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            raffle_id: row.raffle_id,
            name: row.name,
            phone: row.phone,
            national_id: row.national_id,
            email: row.email,
            extra: serde_json::from_str(&row.extra_fields).map_err(|e| {
                EngineError::Internal(format!("corrupt extra_fields for participant {}: {e}", row.id))
            })?,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

/// A row from the `draw_events` table.
#[derive(Debug, sqlx::FromRow)]
pub struct DrawEventRow {
    /// Event identifier.
    pub id: DrawEventId,
    /// Raffle identifier.
    pub raffle_id: RaffleId,
    /// Requested winner count.
    pub requested_count: i64,
    /// Committed winner count.
    pub winner_count: i64,
    /// Notes.
    pub notes: Option<String>,
    /// Executing administrator.
    pub drawn_by: String,
    /// Commit timestamp.
    pub drawn_at: DateTime<Utc>,
}

impl TryFrom<DrawEventRow> for DrawEvent {
    type Error = EngineError;

    fn try_from(row: DrawEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            raffle_id: row.raffle_id,
            requested_count: to_u32("draw_events.requested_count", row.requested_count)?,
            winner_count: to_u32("draw_events.winner_count", row.winner_count)?,
            notes: row.notes,
            drawn_by: row.drawn_by,
            drawn_at: row.drawn_at,
        })
    }
}

/// A row from the `results` table.
#[derive(Debug, sqlx::FromRow)]
pub struct ResultRow {
    /// Winning participant.
    pub participant_id: ParticipantId,
    /// Position within the event.
    pub position: i64,
    /// Owning draw event.
    pub draw_event_id: DrawEventId,
}

impl TryFrom<&ResultRow> for Winner {
    type Error = EngineError;

    fn try_from(row: &ResultRow) -> Result<Self, Self::Error> {
        Ok(Self {
            participant_id: row.participant_id,
            position: to_u32("results.position", row.position)?,
        })
    }
}

/// A `results` row joined with its participant's owning raffle.
#[derive(Debug, sqlx::FromRow)]
pub struct AuditRecord {
    /// Result row key.
    pub result_id: i64,
    /// Referenced participant.
    pub participant_id: ParticipantId,
    /// Stored position.
    pub position: i64,
    /// Owning event.
    pub draw_event_id: DrawEventId,
    /// Participant's raffle, `None` when the participant row is missing.
    pub participant_raffle_id: Option<RaffleId>,
}

impl From<AuditRecord> for AuditRow {
    fn from(record: AuditRecord) -> Self {
        Self {
            result_id: record.result_id,
            participant_id: record.participant_id,
            position: record.position,
            draw_event_id: record.draw_event_id,
            participant_raffle_id: record.participant_raffle_id,
        }
    }
}

/// A stored entry from the `engine_events` log.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Raffle the event concerns.
    pub raffle_id: RaffleId,
    /// Event type discriminator (e.g. `"draw_committed"`).
    pub event_type: String,
    /// Full event payload.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// A raw `engine_events` row.
#[derive(Debug, sqlx::FromRow)]
pub struct StoredEventRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Raffle the event concerns.
    pub raffle_id: RaffleId,
    /// Event type discriminator.
    pub event_type: String,
    /// JSON payload text.
    pub payload: String,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StoredEventRow> for StoredEvent {
    type Error = EngineError;

    fn try_from(row: StoredEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            raffle_id: row.raffle_id,
            event_type: row.event_type,
            payload: serde_json::from_str(&row.payload).map_err(|e| {
                EngineError::Internal(format!("corrupt payload for event {}: {e}", row.id))
            })?,
            created_at: row.created_at,
        })
    }
}

fn to_u32(column: &str, value: i64) -> Result<u32, EngineError> {
    u32::try_from(value)
        .map_err(|_| EngineError::Internal(format!("{column} out of range: {value}")))
}
