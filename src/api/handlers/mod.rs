//! REST endpoint handlers organized by resource.

pub mod draw;
pub mod participant;
pub mod raffle;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(raffle::routes())
        .merge(participant::routes())
        .merge(draw::routes())
}
