//! Broadcast event bus for availability events.
//!
//! Any number of subscribers receive every event published after they
//! subscribed. Slow subscribers that fall more than the channel capacity
//! behind skip the oldest events and are told how many they missed.

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::availability::AvailabilityEvent;
use crate::domain::ports::{AvailabilityEventPublisher, EventPublishError};

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Tokio broadcast channel implementing [`AvailabilityEventPublisher`].
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<AvailabilityEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<AvailabilityEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[async_trait]
impl AvailabilityEventPublisher for BroadcastEventBus {
    async fn publish(&self, event: AvailabilityEvent) -> Result<(), EventPublishError> {
        // `send` only fails when nobody is subscribed.
        if self.sender.send(event).is_err() {
            tracing::trace!("availability event dropped without subscribers");
        }
        Ok(())
    }
}

/// Log every event until the bus is dropped.
///
/// Stands in for notification and analytics consumers.
pub fn spawn_logging_subscriber(bus: &BroadcastEventBus) -> JoinHandle<()> {
    let mut receiver = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let context = event.context();
                    info!(
                        event = event.name(),
                        user_id = %event.user_id(),
                        trace_id = ?context.trace_id.map(|id| id.to_string()),
                        occurred_at = %context.occurred_at,
                        "availability event"
                    );
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "event subscriber lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
