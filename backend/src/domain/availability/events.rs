//! Domain events emitted by the availability engine.
//!
//! Events stay transport agnostic. Subscribers (notifications, analytics)
//! react to them without the engine depending on those consumers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::profile::{TenantId, UserId};
use crate::domain::TraceId;

/// Payload shared by every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Correlation identifier of the request that caused the event.
    pub trace_id: Option<TraceId>,
    pub occurred_at: DateTime<Utc>,
}

impl EventContext {
    /// Capture the ambient trace identifier at `occurred_at`.
    pub fn capture(occurred_at: DateTime<Utc>) -> Self {
        Self {
            trace_id: TraceId::current(),
            occurred_at,
        }
    }
}

/// Availability lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityEvent {
    ProfileCreated {
        profile_id: Uuid,
        tenant_id: TenantId,
        user_id: UserId,
        context: EventContext,
    },
    ProfileUpdated {
        profile_id: Uuid,
        user_id: UserId,
        context: EventContext,
    },
    ProfileDeleted {
        profile_id: Uuid,
        user_id: UserId,
        context: EventContext,
    },
    SlotBooked {
        slot_id: Uuid,
        booking_id: String,
        user_id: UserId,
        context: EventContext,
    },
    SlotReleased {
        slot_id: Uuid,
        booking_id: String,
        user_id: UserId,
        context: EventContext,
    },
    SlotsRegenerated {
        profile_id: Uuid,
        user_id: UserId,
        slot_count: usize,
        context: EventContext,
    },
}

impl AvailabilityEvent {
    /// Stable event name used by subscribers.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProfileCreated { .. } => "profileCreated",
            Self::ProfileUpdated { .. } => "profileUpdated",
            Self::ProfileDeleted { .. } => "profileDeleted",
            Self::SlotBooked { .. } => "slotBooked",
            Self::SlotReleased { .. } => "slotReleased",
            Self::SlotsRegenerated { .. } => "slotsRegenerated",
        }
    }

    pub fn context(&self) -> &EventContext {
        match self {
            Self::ProfileCreated { context, .. }
            | Self::ProfileUpdated { context, .. }
            | Self::ProfileDeleted { context, .. }
            | Self::SlotBooked { context, .. }
            | Self::SlotReleased { context, .. }
            | Self::SlotsRegenerated { context, .. } => context,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            Self::ProfileCreated { user_id, .. }
            | Self::ProfileUpdated { user_id, .. }
            | Self::ProfileDeleted { user_id, .. }
            | Self::SlotBooked { user_id, .. }
            | Self::SlotReleased { user_id, .. }
            | Self::SlotsRegenerated { user_id, .. } => user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::availability::{at, user};

    #[tokio::test]
    async fn context_captures_scoped_trace_id() {
        let trace_id = TraceId::generate();
        let context =
            TraceId::scope(trace_id, async { EventContext::capture(at("2024-01-01T00:00:00Z")) })
                .await;
        assert_eq!(context.trace_id, Some(trace_id));
    }

    #[test]
    fn names_are_camel_case() {
        let event = AvailabilityEvent::SlotReleased {
            slot_id: Uuid::nil(),
            booking_id: "b-1".to_owned(),
            user_id: user("user-1"),
            context: EventContext::capture(at("2024-01-01T00:00:00Z")),
        };
        assert_eq!(event.name(), "slotReleased");
        assert_eq!(event.user_id().as_str(), "user-1");
        assert!(event.context().trace_id.is_none());
    }
}
