//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RaffleService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Raffle service for all business logic.
    pub raffle_service: Arc<RaffleService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(raffle_service: RaffleService) -> Self {
        Self {
            raffle_service: Arc::new(raffle_service),
        }
    }
}
