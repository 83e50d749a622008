//! Raffle administration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{FieldConfig, Raffle, RaffleStatus};

/// Request body for `POST /raffles`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRaffleRequest {
    /// Display name (max 150 chars).
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Winners per draw.
    pub winner_count: u32,
    /// Registration field requirements. Defaults to phone and email optional,
    /// national id hidden.
    #[serde(default)]
    pub fields: FieldConfig,
}

/// Request body for `PUT /raffles/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status.
    pub status: RaffleStatus,
}

/// Request body for `PUT /raffles/{id}/winner-count`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWinnerCountRequest {
    /// New winners-per-draw value.
    pub winner_count: u32,
}

/// Response body for `GET /raffles`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RaffleListResponse {
    /// Raffles on this page, newest first.
    pub data: Vec<Raffle>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
