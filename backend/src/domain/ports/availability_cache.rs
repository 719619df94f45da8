//! Port for caching loaded query snapshots.
//!
//! The cache is a read-through optimisation only. Entries are never
//! invalidated by bookings or regeneration, so readers may observe data up
//! to one time-to-live old.

use async_trait::async_trait;

use crate::domain::availability::{AvailabilityCacheKey, UserWindowSnapshot};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum AvailabilityCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "availability cache backend failure: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityCache: Send + Sync {
    /// Read the snapshots cached for `key`.
    async fn get(
        &self,
        key: &AvailabilityCacheKey,
    ) -> Result<Option<Vec<UserWindowSnapshot>>, AvailabilityCacheError>;

    /// Store snapshots under `key`.
    async fn put(
        &self,
        key: &AvailabilityCacheKey,
        snapshots: Vec<UserWindowSnapshot>,
    ) -> Result<(), AvailabilityCacheError>;
}

/// Cache that never stores anything. Used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAvailabilityCache;

#[async_trait]
impl AvailabilityCache for NoOpAvailabilityCache {
    async fn get(
        &self,
        _key: &AvailabilityCacheKey,
    ) -> Result<Option<Vec<UserWindowSnapshot>>, AvailabilityCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &AvailabilityCacheKey,
        _snapshots: Vec<UserWindowSnapshot>,
    ) -> Result<(), AvailabilityCacheError> {
        Ok(())
    }
}
