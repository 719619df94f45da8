//! Port for publishing availability events to subscribers.
//!
//! Notification and analytics consumers subscribe to these events; the
//! engine never calls them directly.

use async_trait::async_trait;

use crate::domain::availability::AvailabilityEvent;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when publishing events.
    pub enum EventPublishError {
        /// The transport rejected the event.
        Transport { message: String } => "event transport failed: {message}",
    }
}

/// Publishes [`AvailabilityEvent`]s.
///
/// Having no subscribers is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityEventPublisher: Send + Sync {
    async fn publish(&self, event: AvailabilityEvent) -> Result<(), EventPublishError>;
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventPublisher;

#[async_trait]
impl AvailabilityEventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: AvailabilityEvent) -> Result<(), EventPublishError> {
        Ok(())
    }
}
