//! Outbound adapters implementing domain ports.
//!
//! - **memory**: indexed in-process profile and slot stores
//! - **cache**: moka-backed availability snapshot cache
//! - **events**: tokio broadcast event bus
//! - **scheduling**: cron-driven slot regeneration
//!
//! Adapters translate between domain types and infrastructure. They contain
//! no business logic.

pub mod cache;
pub mod events;
pub mod memory;
pub mod scheduling;
