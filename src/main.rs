//! raffle-engine server entry point.
//!
//! Connects to SQLite, starts the event recorder and serves the REST API.

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use raffle_engine::api;
use raffle_engine::app_state::AppState;
use raffle_engine::config::{EngineConfig, LogFormat};
use raffle_engine::domain::EventBus;
use raffle_engine::persistence::{self, SqlitePersistence};
use raffle_engine::service::{RaffleService, spawn_event_recorder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_format);

    tracing::info!(
        addr = %config.listen_addr,
        database = %config.database_url,
        "starting raffle-engine"
    );

    let pool = persistence::connect(&config)
        .await
        .context("failed to open database")?;
    let store = SqlitePersistence::new(pool);
    let event_bus = EventBus::new(config.event_bus_capacity);

    let _recorder = if config.event_log_enabled {
        Some(spawn_event_recorder(&event_bus, store.clone()))
    } else {
        None
    };

    let app_state = AppState::new(RaffleService::new(store, event_bus));

    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
