//! In-process fan-out of [`RaffleEvent`]s.
//!
//! Every committed mutation is published after its transaction succeeds.
//! The event recorder is the main subscriber; it persists what it receives
//! and logs a gap when it falls more than the channel capacity behind.

use tokio::sync::broadcast;

use super::RaffleEvent;

/// Publisher side of the raffle event stream.
///
/// Delivery is best effort: publishing never blocks a mutation, and a
/// subscriber that lags past `capacity` loses the oldest events, observing a
/// [`broadcast::error::RecvError::Lagged`] before resuming with the newest.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RaffleEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber
    /// (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event` and returns how many subscribers will see it.
    ///
    /// With no subscriber the event is discarded; the committed mutation is
    /// unaffected.
    pub fn publish(&self, event: RaffleEvent) -> usize {
        let raffle_id = event.raffle_id();
        let event_type = event.event_type();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%raffle_id, event_type, delivered, "event published");
        delivered
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RaffleEvent> {
        self.sender.subscribe()
    }
}
