//! Domain layer: identifiers, raffle and participant model, draw results,
//! integrity auditing, events, and per-raffle draw locks.

pub mod actor;
pub mod draw;
pub mod draw_lock;
pub mod event_bus;
pub mod ids;
pub mod integrity;
pub mod participant;
pub mod raffle;
pub mod raffle_event;

pub use actor::Actor;
pub use draw::{
    CommittedDraw, DrawEvent, DrawMeta, DrawRequest, REVERSAL_CONFIRMATION, ReversalOutcome,
    Winner,
};
pub use draw_lock::{DrawLocks, DrawPermit};
pub use event_bus::EventBus;
pub use ids::{DrawEventId, ParticipantId, RaffleId};
pub use integrity::{IntegrityIssue, IntegrityReport, IssueKind, Severity};
pub use participant::{NewParticipant, Participant, ParticipantPage, RegistrationForm};
pub use raffle::{FieldConfig, FieldRequirement, NewRaffle, Raffle, RaffleStatus};
pub use raffle_event::RaffleEvent;
