//! Background task persisting bus events to the `engine_events` log.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::domain::EventBus;
use crate::persistence::SqlitePersistence;

/// Subscribes to `bus` and appends every event to the event log until the
/// bus is closed.
///
/// Lagging behind the channel capacity drops the oldest events; the gap is
/// logged. Write failures are logged and do not stop the recorder.
#[must_use]
pub fn spawn_event_recorder(bus: &EventBus, store: SqlitePersistence) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(err) = store.save_event(&event).await {
                        tracing::warn!(
                            raffle_id = %event.raffle_id(),
                            event_type = event.event_type(),
                            error = %err,
                            "failed to record engine event"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event recorder lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("event recorder stopped");
    })
}
