//! Driving port for reading profiles and answering availability queries.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::availability::{
    AvailabilityProfile, AvailabilityQueryRequest, AvailabilityResult, AvailabilitySlot,
    BulkAvailabilityRequest,
};

use super::ProfileFilter;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityQuery: Send + Sync {
    /// Fetch one profile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    async fn get_profile(&self, profile_id: Uuid) -> Result<AvailabilityProfile, Error>;

    async fn list_profiles(&self, filter: ProfileFilter)
    -> Result<Vec<AvailabilityProfile>, Error>;

    /// Fetch one slot.
    async fn get_slot(&self, slot_id: Uuid) -> Result<AvailabilitySlot, Error>;

    /// Per-user availability inside a window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for malformed queries.
    async fn query(
        &self,
        request: AvailabilityQueryRequest,
    ) -> Result<Vec<AvailabilityResult>, Error>;

    /// Run independent queries concurrently. Results keep the order of
    /// `request.queries`.
    async fn bulk_query(
        &self,
        request: BulkAvailabilityRequest,
    ) -> Result<Vec<Vec<AvailabilityResult>>, Error>;
}
