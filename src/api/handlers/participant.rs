//! Registration handlers: admit, list, deactivate, eligible pool.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{
    AdmitParticipantResponse, EligibleResponse, PaginationParams, ParticipantListResponse,
};
use crate::app_state::AppState;
use crate::domain::{Actor, ParticipantId, RaffleId, RegistrationForm};
use crate::error::{EngineError, ErrorResponse};

/// `POST /raffles/{id}/participants`: public registration.
///
/// # Errors
///
/// Returns [`EngineError::Validation`], [`EngineError::DuplicateParticipant`]
/// or [`EngineError::RaffleClosed`].
#[utoipa::path(
    post,
    path = "/api/v1/raffles/{id}/participants",
    tag = "Participants",
    summary = "Register a participant",
    description = "Validates the form against the raffle's field configuration and admits it unless an active participant with the same identity exists.",
    request_body = RegistrationForm,
    params(("id" = uuid::Uuid, Path, description = "Raffle UUID")),
    responses(
        (status = 201, description = "Participant admitted", body = AdmitParticipantResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
        (status = 409, description = "Duplicate registration or raffle not open", body = ErrorResponse),
    )
)]
pub async fn admit_participant(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, EngineError> {
    let participant_id = state
        .raffle_service
        .admit_participant(raffle_id, form)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AdmitParticipantResponse {
            raffle_id,
            participant_id,
        }),
    ))
}

/// `GET /raffles/{id}/participants`: paginated participant list.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}/participants",
    tag = "Participants",
    summary = "List participants",
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Participants in registration order", body = ParticipantListResponse),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, EngineError> {
    let params = params.clamped();
    let page = state
        .raffle_service
        .list_participants(raffle_id, params.per_page, params.offset())
        .await?;
    Ok(Json(ParticipantListResponse {
        data: page.participants,
        pagination: params.meta(page.total),
    }))
}

/// `DELETE /raffles/{id}/participants/{participant_id}`: deactivate.
///
/// The row is kept; only the active flag is cleared. Existing results of
/// the participant are not touched.
///
/// # Errors
///
/// Returns [`EngineError::ParticipantNotFound`].
#[utoipa::path(
    delete,
    path = "/api/v1/raffles/{id}/participants/{participant_id}",
    tag = "Participants",
    summary = "Deactivate a participant",
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        ("participant_id" = uuid::Uuid, Path, description = "Participant UUID"),
        ("x-actor" = String, Header, description = "Operator identity"),
    ),
    responses(
        (status = 204, description = "Participant deactivated"),
        (status = 404, description = "Participant not found", body = ErrorResponse),
    )
)]
pub async fn deactivate_participant(
    State(state): State<AppState>,
    Path((raffle_id, participant_id)): Path<(RaffleId, ParticipantId)>,
    actor: Actor,
) -> Result<impl IntoResponse, EngineError> {
    state
        .raffle_service
        .deactivate_participant(&actor, raffle_id, participant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /raffles/{id}/eligible`: participants that can still win.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}/eligible",
    tag = "Participants",
    summary = "Eligible pool",
    description = "Active participants without a result row in this raffle.",
    params(("id" = uuid::Uuid, Path, description = "Raffle UUID")),
    responses(
        (status = 200, description = "Eligible participants", body = EligibleResponse),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn eligible_participants(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
) -> Result<impl IntoResponse, EngineError> {
    let participant_ids = state.raffle_service.resolve_eligible(raffle_id).await?;
    Ok(Json(EligibleResponse {
        raffle_id,
        count: participant_ids.len(),
        participant_ids,
    }))
}

/// Participant routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/raffles/{id}/participants",
            get(list_participants).post(admit_participant),
        )
        .route(
            "/raffles/{id}/participants/{participant_id}",
            delete(deactivate_participant),
        )
        .route("/raffles/{id}/eligible", get(eligible_participants))
}
