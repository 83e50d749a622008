//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::panic)]

use raffle_engine::config::EngineConfig;
use raffle_engine::domain::{
    Actor, EventBus, FieldConfig, FieldRequirement, NewRaffle, ParticipantId, Raffle, RaffleId,
    RegistrationForm,
};
use raffle_engine::persistence::{SqlitePersistence, connect, connect_in_memory};
use raffle_engine::service::RaffleService;

/// Builds a service over a fresh in-memory database.
pub async fn service() -> RaffleService {
    let Ok(pool) = connect_in_memory().await else {
        panic!("in-memory database");
    };
    RaffleService::new(SqlitePersistence::new(pool), EventBus::new(64))
}

/// Builds a service over a database file in `dir` with a pool of
/// `max_connections`, so concurrent requests use separate connections.
pub async fn file_service(dir: &tempfile::TempDir, max_connections: u32) -> RaffleService {
    let config = EngineConfig {
        database_url: format!("sqlite://{}", dir.path().join("raffle.db").display()),
        database_max_connections: max_connections,
        ..EngineConfig::in_memory()
    };
    let Ok(pool) = connect(&config).await else {
        panic!("file database");
    };
    RaffleService::new(SqlitePersistence::new(pool), EventBus::new(64))
}

/// The operator used by every test.
pub fn actor() -> Actor {
    let Ok(actor) = Actor::new("ops@example.org") else {
        panic!("valid actor");
    };
    actor
}

/// Creates an active raffle with default field configuration.
pub async fn raffle(service: &RaffleService, winner_count: u32) -> Raffle {
    raffle_with_fields(service, winner_count, FieldConfig::default()).await
}

/// Creates an active raffle that requires a national id.
pub async fn raffle_with_national_id(service: &RaffleService, winner_count: u32) -> Raffle {
    let fields = FieldConfig {
        national_id: FieldRequirement::Required,
        ..FieldConfig::default()
    };
    raffle_with_fields(service, winner_count, fields).await
}

/// Creates an active raffle with the given field configuration.
pub async fn raffle_with_fields(
    service: &RaffleService,
    winner_count: u32,
    fields: FieldConfig,
) -> Raffle {
    let Ok(new) = NewRaffle::new("Spring giveaway", None, winner_count, fields) else {
        panic!("valid raffle");
    };
    let Ok(raffle) = service.create_raffle(&actor(), new).await else {
        panic!("raffle created");
    };
    raffle
}

/// Registration form with a name and phone.
pub fn form(name: &str, phone: &str) -> RegistrationForm {
    RegistrationForm {
        name: name.to_string(),
        phone: Some(phone.to_string()),
        ..RegistrationForm::default()
    }
}

/// Admits a participant and returns its id.
pub async fn admit(
    service: &RaffleService,
    raffle_id: RaffleId,
    name: &str,
    phone: &str,
) -> ParticipantId {
    match service.admit_participant(raffle_id, form(name, phone)).await {
        Ok(id) => id,
        Err(err) => panic!("admission of {name} failed: {err}"),
    }
}
