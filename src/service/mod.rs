//! Service layer: business logic orchestration.
//!
//! [`RaffleService`] coordinates the participant store, the draw selector,
//! the result committer and the integrity auditor, and emits events through
//! the [`super::domain::EventBus`].

pub mod event_recorder;
pub mod raffle_service;
pub mod selector;

pub use event_recorder::spawn_event_recorder;
pub use raffle_service::RaffleService;
pub use selector::select_winners;
