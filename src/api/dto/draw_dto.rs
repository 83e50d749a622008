//! Draw, reversal, integrity and event log DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DrawEventId, DrawRequest};

/// Request body for `POST /raffles/{id}/draws`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExecuteDrawRequest {
    /// Winners to draw; defaults to the raffle's configured count.
    #[serde(default)]
    pub count: Option<u32>,
    /// Optional notes stored with the draw event.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<ExecuteDrawRequest> for DrawRequest {
    fn from(req: ExecuteDrawRequest) -> Self {
        Self {
            count: req.count,
            notes: req.notes,
        }
    }
}

/// Request body for `POST /raffles/{id}/draws/{event_id}/reverse`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReverseDrawRequest {
    /// Must equal `REVERSE-DRAW`.
    pub confirmation: String,
}

/// Query parameters for `GET /raffles/{id}/integrity`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IntegrityQuery {
    /// Restrict event-level checks to this draw event.
    #[serde(default)]
    #[param(value_type = Option<uuid::Uuid>)]
    pub event_id: Option<DrawEventId>,
}

/// Query parameters for `GET /raffles/{id}/events`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventLogQuery {
    /// Maximum number of events (1–500). Defaults to 100.
    #[serde(default = "default_event_limit")]
    pub limit: u32,
}

fn default_event_limit() -> u32 {
    100
}
