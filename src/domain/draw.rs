//! Draw events, winners and reversal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Actor, DrawEventId, ParticipantId, RaffleId};
use crate::error::EngineError;

/// Token an administrator must echo back to reverse a draw event.
pub const REVERSAL_CONFIRMATION: &str = "REVERSE-DRAW";

/// Maximum length of draw notes.
pub const MAX_NOTES_LEN: usize = 1_000;

/// One ranked winner. Position 1 is the first prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Winner {
    /// Winning participant.
    pub participant_id: ParticipantId,
    /// 1-based rank within the draw event.
    pub position: u32,
}

/// Metadata of one committed draw execution.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawEvent {
    /// Event identifier shared by all result rows of this draw.
    pub id: DrawEventId,
    /// Raffle the draw belongs to.
    pub raffle_id: RaffleId,
    /// Number of winners the administrator asked for.
    pub requested_count: u32,
    /// Number of winners actually committed (bounded by the eligible pool).
    pub winner_count: u32,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Administrator who executed the draw.
    pub drawn_by: String,
    /// Commit timestamp.
    pub drawn_at: DateTime<Utc>,
}

/// A draw event together with its ordered winners.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommittedDraw {
    /// Event metadata.
    pub event: DrawEvent,
    /// Winners ordered by position.
    pub winners: Vec<Winner>,
}

/// Parameters of a draw execution.
#[derive(Debug, Clone, Default)]
pub struct DrawRequest {
    /// Winners to draw. Defaults to the raffle's configured count.
    pub count: Option<u32>,
    /// Optional free-text notes stored with the event.
    pub notes: Option<String>,
}

impl DrawRequest {
    /// Trims notes and checks their length.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a zero count or overlong notes.
    pub fn normalized(self) -> Result<Self, EngineError> {
        if self.count == Some(0) {
            return Err(EngineError::validation("count", "must be at least 1"));
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(n) = &notes
            && n.chars().count() > MAX_NOTES_LEN
        {
            return Err(EngineError::validation(
                "notes",
                format!("must be at most {MAX_NOTES_LEN} characters"),
            ));
        }
        Ok(Self {
            count: self.count,
            notes,
        })
    }
}

/// What the committer records alongside the winners.
#[derive(Debug, Clone)]
pub struct DrawMeta {
    /// Number of winners originally requested.
    pub requested_count: u32,
    /// Optional notes.
    pub notes: Option<String>,
    /// Executing administrator.
    pub actor: Actor,
}

/// Outcome of a successful reversal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReversalOutcome {
    /// Raffle the event belonged to.
    pub raffle_id: RaffleId,
    /// Reversed event.
    pub draw_event_id: DrawEventId,
    /// Winners that were removed and are eligible again.
    pub released: Vec<Winner>,
}

/// Checks that winners form the dense position sequence `1..=n` over
/// distinct participants.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] for an empty list, a gap or
/// repeated position, or a repeated participant.
pub fn check_winner_list(winners: &[Winner]) -> Result<(), EngineError> {
    if winners.is_empty() {
        return Err(EngineError::InvalidRequest(
            "a draw must commit at least one winner".to_string(),
        ));
    }
    let mut positions: Vec<u32> = winners.iter().map(|w| w.position).collect();
    positions.sort_unstable();
    let dense = positions
        .iter()
        .zip(1u32..)
        .all(|(position, expected)| *position == expected);
    if !dense {
        return Err(EngineError::InvalidRequest(
            "winner positions must form the sequence 1..n".to_string(),
        ));
    }
    let mut participants: Vec<ParticipantId> = winners.iter().map(|w| w.participant_id).collect();
    participants.sort_unstable();
    participants.dedup();
    if participants.len() != winners.len() {
        return Err(EngineError::InvalidRequest(
            "a participant can hold only one position".to_string(),
        ));
    }
    Ok(())
}
