//! Moka-backed availability cache.
//!
//! Entries expire after the configured time-to-live and are never
//! invalidated early. Capacity is bounded so a burst of distinct queries
//! cannot grow memory without limit.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::availability::{AvailabilityCacheKey, UserWindowSnapshot};
use crate::domain::ports::{AvailabilityCache, AvailabilityCacheError};

/// Default number of cached query windows.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Time-to-live cache of loaded query snapshots.
#[derive(Clone)]
pub struct MokaAvailabilityCache {
    entries: Cache<AvailabilityCacheKey, Vec<UserWindowSnapshot>>,
}

impl MokaAvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, max_capacity: u64) -> Self {
        tracing::info!(
            ttl_seconds = ttl.as_secs(),
            max_capacity,
            "availability cache configured"
        );
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl AvailabilityCache for MokaAvailabilityCache {
    async fn get(
        &self,
        key: &AvailabilityCacheKey,
    ) -> Result<Option<Vec<UserWindowSnapshot>>, AvailabilityCacheError> {
        Ok(self.entries.get(key).await)
    }

    async fn put(
        &self,
        key: &AvailabilityCacheKey,
        snapshots: Vec<UserWindowSnapshot>,
    ) -> Result<(), AvailabilityCacheError> {
        self.entries.insert(key.clone(), snapshots).await;
        Ok(())
    }
}
