//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain types that are already serializable (raffles, participants,
//! committed draws, integrity reports) are returned as-is; this module only
//! holds request bodies, query parameters and envelope types.

pub mod common_dto;
pub mod draw_dto;
pub mod participant_dto;
pub mod raffle_dto;

pub use common_dto::*;
pub use draw_dto::*;
pub use participant_dto::*;
pub use raffle_dto::*;
