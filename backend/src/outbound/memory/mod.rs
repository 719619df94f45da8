//! In-memory stores for profiles and slots.
//!
//! State lives for the lifetime of the process and is lost on restart.
//! Swapping in a database only requires new [`crate::domain::ports`]
//! implementations.

mod profile_store;
mod slot_store;

pub use profile_store::InMemoryProfileStore;
pub use slot_store::InMemorySlotStore;
