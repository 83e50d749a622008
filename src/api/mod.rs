//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All raffle endpoints are mounted under `/api/v1`. Mutating endpoints
//! take the operator identity from the `X-Actor` header.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;
#[cfg(not(feature = "swagger-ui"))]
use axum::{Json, routing::get};
use utoipa::OpenApi;

use crate::app_state::AppState;
pub use openapi::ApiDoc;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_router())
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    let doc = ApiDoc::openapi();
    Router::new().route(OPENAPI_PATH, get(move || async move { Json(doc) }))
}
