//! Registration and eligibility DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{Participant, ParticipantId, RaffleId};

/// Response body for `POST /raffles/{id}/participants` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct AdmitParticipantResponse {
    /// Raffle the participant registered for.
    pub raffle_id: RaffleId,
    /// New participant identifier.
    pub participant_id: ParticipantId,
}

/// Response body for `GET /raffles/{id}/participants`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantListResponse {
    /// Participants on this page.
    pub data: Vec<Participant>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /raffles/{id}/eligible`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EligibleResponse {
    /// Raffle identifier.
    pub raffle_id: RaffleId,
    /// Number of participants that can still be drawn.
    pub count: usize,
    /// Eligible participants in registration order.
    pub participant_ids: Vec<ParticipantId>,
}
