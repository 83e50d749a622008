//! Draw handlers: execute, history, reversal, integrity audit, event log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{EventLogQuery, ExecuteDrawRequest, IntegrityQuery, ReverseDrawRequest};
use crate::app_state::AppState;
use crate::domain::{Actor, CommittedDraw, DrawEventId, IntegrityReport, RaffleId, ReversalOutcome};
use crate::error::{EngineError, ErrorResponse};
use crate::persistence::StoredEvent;

/// `POST /raffles/{id}/draws`: draw winners.
///
/// An empty body draws the raffle's configured winner count.
///
/// # Errors
///
/// Returns [`EngineError::DrawInProgress`],
/// [`EngineError::InsufficientParticipants`], [`EngineError::StaleSelection`]
/// or [`EngineError::RaffleClosed`].
#[utoipa::path(
    post,
    path = "/api/v1/raffles/{id}/draws",
    tag = "Draws",
    summary = "Execute a draw",
    description = "Selects winners uniformly at random from the eligible pool and commits them as one draw event.",
    request_body(content = ExecuteDrawRequest, description = "Optional count and notes; the body may be omitted"),
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        ("x-actor" = String, Header, description = "Operator identity"),
    ),
    responses(
        (status = 201, description = "Draw committed", body = CommittedDraw),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
        (status = 409, description = "Draw in progress, stale selection or raffle finished", body = ErrorResponse),
        (status = 422, description = "No eligible participants", body = ErrorResponse),
    )
)]
pub async fn execute_draw(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    actor: Actor,
    req: Option<Json<ExecuteDrawRequest>>,
) -> Result<impl IntoResponse, EngineError> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let committed = state
        .raffle_service
        .execute_draw(&actor, raffle_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(committed)))
}

/// `GET /raffles/{id}/draws`: draw history with winners.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}/draws",
    tag = "Draws",
    summary = "List draws",
    params(("id" = uuid::Uuid, Path, description = "Raffle UUID")),
    responses(
        (status = 200, description = "Draw events in chronological order", body = Vec<CommittedDraw>),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn list_draws(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
) -> Result<impl IntoResponse, EngineError> {
    let draws = state.raffle_service.list_draws(raffle_id).await?;
    Ok(Json(draws))
}

/// `POST /raffles/{id}/draws/{event_id}/reverse`: undo one draw event.
///
/// # Errors
///
/// Returns [`EngineError::BadConfirmation`], [`EngineError::EventNotFound`]
/// or [`EngineError::DrawInProgress`].
#[utoipa::path(
    post,
    path = "/api/v1/raffles/{id}/draws/{event_id}/reverse",
    tag = "Draws",
    summary = "Reverse a draw event",
    description = "Deletes every result of the event atomically. Requires the literal confirmation `REVERSE-DRAW`.",
    request_body = ReverseDrawRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        ("event_id" = uuid::Uuid, Path, description = "Draw event UUID"),
        ("x-actor" = String, Header, description = "Operator identity"),
    ),
    responses(
        (status = 200, description = "Draw reversed", body = ReversalOutcome),
        (status = 400, description = "Missing or wrong confirmation", body = ErrorResponse),
        (status = 404, description = "Draw event not found", body = ErrorResponse),
        (status = 409, description = "Draw in progress", body = ErrorResponse),
    )
)]
pub async fn reverse_draw(
    State(state): State<AppState>,
    Path((raffle_id, event_id)): Path<(RaffleId, DrawEventId)>,
    actor: Actor,
    Json(req): Json<ReverseDrawRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let outcome = state
        .raffle_service
        .reverse_draw_event(&actor, raffle_id, event_id, &req.confirmation)
        .await?;
    Ok(Json(outcome))
}

/// `GET /raffles/{id}/integrity`: audit stored results.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`]. Findings are part of the report.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}/integrity",
    tag = "Draws",
    summary = "Validate result integrity",
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        IntegrityQuery,
    ),
    responses(
        (status = 200, description = "Integrity report", body = IntegrityReport),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn validate_integrity(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    Query(query): Query<IntegrityQuery>,
) -> Result<impl IntoResponse, EngineError> {
    let report = state
        .raffle_service
        .validate_integrity(raffle_id, query.event_id)
        .await?;
    Ok(Json(report))
}

/// `GET /raffles/{id}/events`: recorded engine events, newest first.
///
/// # Errors
///
/// Returns [`EngineError::RaffleNotFound`] if the raffle does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/raffles/{id}/events",
    tag = "Draws",
    summary = "Raffle event log",
    params(
        ("id" = uuid::Uuid, Path, description = "Raffle UUID"),
        EventLogQuery,
    ),
    responses(
        (status = 200, description = "Logged events", body = Vec<StoredEvent>),
        (status = 404, description = "Raffle not found", body = ErrorResponse),
    )
)]
pub async fn raffle_events(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    Query(query): Query<EventLogQuery>,
) -> Result<impl IntoResponse, EngineError> {
    let events = state
        .raffle_service
        .raffle_events(raffle_id, query.limit)
        .await?;
    Ok(Json(events))
}

/// Draw routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/raffles/{id}/draws", post(execute_draw).get(list_draws))
        .route("/raffles/{id}/draws/{event_id}/reverse", post(reverse_draw))
        .route("/raffles/{id}/integrity", get(validate_integrity))
        .route("/raffles/{id}/events", get(raffle_events))
}
