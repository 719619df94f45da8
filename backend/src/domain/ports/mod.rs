//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (stores, cache, event publisher) are implemented by outbound
//! adapters. Driving ports ([`AvailabilityCommand`], [`AvailabilityQuery`])
//! are implemented by the domain service and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod availability_cache;
mod availability_command;
mod availability_event_publisher;
mod availability_query;
mod profile_store;
mod slot_store;

#[cfg(test)]
pub use availability_cache::MockAvailabilityCache;
pub use availability_cache::{AvailabilityCache, AvailabilityCacheError, NoOpAvailabilityCache};
#[cfg(test)]
pub use availability_command::MockAvailabilityCommand;
pub use availability_command::{
    AvailabilityCommand, BookSlotRequest, CreateFromTemplateRequest, CreateProfileRequest,
    RegenerationReport, RegenerationSummary, ReleaseSlotRequest, UpdateProfileRequest,
};
#[cfg(test)]
pub use availability_event_publisher::MockAvailabilityEventPublisher;
pub use availability_event_publisher::{
    AvailabilityEventPublisher, EventPublishError, NoOpEventPublisher,
};
#[cfg(test)]
pub use availability_query::MockAvailabilityQuery;
pub use availability_query::AvailabilityQuery;
#[cfg(test)]
pub use profile_store::MockProfileStore;
pub use profile_store::{FixtureProfileStore, ProfileFilter, ProfileStore, ProfileStoreError};
#[cfg(test)]
pub use slot_store::MockSlotStore;
pub use slot_store::{FixtureSlotStore, SlotStore, SlotStoreError};
