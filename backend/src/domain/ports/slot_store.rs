//! Port for availability slot persistence.
//!
//! Slots are derived state. Regeneration replaces a profile's future slots
//! wholesale, while booking and release update a single slot in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::availability::{AvailabilitySlot, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by slot store adapters.
    pub enum SlotStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "slot store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "slot store query failed: {message}",
    }
}

/// Storage for [`AvailabilitySlot`] values, indexed by user and profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilitySlot>, SlotStoreError>;

    /// Insert or replace one slot keyed by its id.
    async fn save(&self, slot: &AvailabilitySlot) -> Result<(), SlotStoreError>;

    /// Slots of `profile_id` starting at or after `from`, ordered by start.
    async fn list_future_for_profile(
        &self,
        profile_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError>;

    /// Delete every slot of `profile_id` starting at or after `from` and
    /// store `slots` in their place. Earlier slots are left untouched.
    async fn replace_future_for_profile(
        &self,
        profile_id: Uuid,
        from: DateTime<Utc>,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<(), SlotStoreError>;

    /// Slots of `user_id` lying entirely inside `[start, end]`, ordered by
    /// start, whatever their status.
    async fn find_for_user_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError>;

    /// Earliest available slot of `user_id` starting at or after `after`.
    async fn find_next_available_after(
        &self,
        user_id: &UserId,
        after: DateTime<Utc>,
    ) -> Result<Option<AvailabilitySlot>, SlotStoreError>;

    /// Delete every slot of `profile_id`, returning how many were removed.
    async fn delete_for_profile(&self, profile_id: Uuid) -> Result<usize, SlotStoreError>;
}

/// Fixture store that holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSlotStore;

#[async_trait]
impl SlotStore for FixtureSlotStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<AvailabilitySlot>, SlotStoreError> {
        Ok(None)
    }

    async fn save(&self, _slot: &AvailabilitySlot) -> Result<(), SlotStoreError> {
        Ok(())
    }

    async fn list_future_for_profile(
        &self,
        _profile_id: Uuid,
        _from: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError> {
        Ok(Vec::new())
    }

    async fn replace_future_for_profile(
        &self,
        _profile_id: Uuid,
        _from: DateTime<Utc>,
        _slots: Vec<AvailabilitySlot>,
    ) -> Result<(), SlotStoreError> {
        Ok(())
    }

    async fn find_for_user_in_range(
        &self,
        _user_id: &UserId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError> {
        Ok(Vec::new())
    }

    async fn find_next_available_after(
        &self,
        _user_id: &UserId,
        _after: DateTime<Utc>,
    ) -> Result<Option<AvailabilitySlot>, SlotStoreError> {
        Ok(None)
    }

    async fn delete_for_profile(&self, _profile_id: Uuid) -> Result<usize, SlotStoreError> {
        Ok(0)
    }
}
