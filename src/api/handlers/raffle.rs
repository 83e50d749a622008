//! Raffle administration handlers: create, list, get, status, winner count.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    CreateRaffleRequest, PaginationParams, RaffleListResponse, UpdateStatusRequest, UpdateWinnerCountRequest,
};
use crate::app_state::AppState;
use crate::domain::{Actor, NewRaffle, Raffle, RaffleId};
use crate::error::{EngineError, ErrorResponse};

/// `POST /raffles`: create a raffle.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for a bad name, description or
/// winner count.
#[utoipa::path(
    post,
    path = "/api/v1/raffles",
    tag = "Raffles",
    summary = "Create a raffle",
    description = "Creates an active raffle with the given winner count and registration field configuration.",
    request_body = CreateRaffleRequest,
    params(("x-actor" = String, Header, description = "Operator identity")),
    responses(
        (status = 201, description = "Raffle created", body = Raffle),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_raffle(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateRaffleRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let new = NewRaffle::new(
        &req.name,
        req.description.as_deref(),
        req.winner_count,
        req.fields,
    )?;
    let raffle = state.raffle_service.create_raffle(&actor, new).await?;
    Ok((StatusCode::CREATED, Json(raffle)))
}

/// `GET /raffles`: list raffles, newest first.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/raffles",
    tag = "Raffles",
    summary = "List raffles",
    params(PaginationParams),
    responses(
        (status = 200, description = "Raffles on the requested page", body = RaffleListResponse),
    )
)]
pub async fn list_raffles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, EngineError> {
    let raffles = state.raffle_service.list_raffles().await?;
    let (data, pagination) = params.paginate(raffles);
    Ok(Json(RaffleListResponse { data, pagination }))
}

/// `GET /raffles/{id}`: get one raffle.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`] if it does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}",
    tag = "Raffles",
    summary = "Get raffle",
    params(("id" = uuid::Uuid, Path, description = "Raffle UUID")),
    responses(
        (status = 200, description = "Raffle details", body = Raffle),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn get_raffle(
    State(state): State<AppState>,
    Path(id): Path<RaffleId>,
) -> Result<impl IntoResponse, EngineError> {
    let raffle = state.raffle_service.get_raffle(id).await?;
    Ok(Json(raffle))
}

/// `PUT /raffles/{id}/status`: pause, resume or finish a raffle.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] when reopening a finished raffle.
#[utoipa::path(
    put,
    path = "/api/v1/raffles/{id}/status",
    tag = "Raffles",
    summary = "Change raffle status",
    description = "Moves the raffle between active and paused, or finishes it. Finished is terminal.",
    request_body = UpdateStatusRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        ("x-actor" = String, Header, description = "Operator identity"),
    ),
    responses(
        (status = 200, description = "Updated raffle", body = Raffle),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<RaffleId>,
    actor: Actor,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let raffle = state.raffle_service.set_status(&actor, id, req.status).await?;
    Ok(Json(raffle))
}

/// `PUT /raffles/{id}/winner-count`: reconfigure winners per draw.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] or [`EngineError::RaffleClosed`].
#[utoipa::path(
    put,
    path = "/api/v1/raffles/{id}/winner-count",
    tag = "Raffles",
    summary = "Change winner count",
    description = "Existing results are untouched. The integrity audit reports results that exceed the new count as warnings.",
    request_body = UpdateWinnerCountRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        ("x-actor" = String, Header, description = "Operator identity"),
    ),
    responses(
        (status = 200, description = "Updated raffle", body = Raffle),
        (status = 400, description = "Invalid winner count", body = ErrorResponse),
        (status = 409, description = "Raffle finished", body = ErrorResponse),
    )
)]
pub async fn update_winner_count(
    State(state): State<AppState>,
    Path(id): Path<RaffleId>,
    actor: Actor,
    Json(req): Json<UpdateWinnerCountRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let raffle = state
        .raffle_service
        .set_winner_count(&actor, id, req.winner_count)
        .await?;
    Ok(Json(raffle))
}

/// Raffle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/raffles", post(create_raffle).get(list_raffles))
        .route("/raffles/{id}", get(get_raffle))
        .route("/raffles/{id}/status", put(update_status))
        .route("/raffles/{id}/winner-count", put(update_winner_count))
}
