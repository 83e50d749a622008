//! # raffle-engine
//!
//! Registration and draw execution engine for raffles.
//!
//! Participants register against a raffle's field configuration and are
//! deduplicated by identity. Administrators draw winners uniformly at random
//! from the eligible pool (active participants that have not won yet), reverse
//! individual draw events, and audit stored results for integrity.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RaffleService (service/)
//!     │     ├── DrawLocks, integrity audit (domain/)
//!     │     └── EventBus ──► event recorder
//!     │
//!     └── SQLite Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
