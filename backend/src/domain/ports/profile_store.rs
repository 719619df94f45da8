//! Port for availability profile persistence.
//!
//! Profiles are the source of truth for availability; slots are derived from
//! them. Adapters may keep profiles in memory or in a database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::availability::{AvailabilityProfile, ProfileStatus, TenantId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile store adapters.
    pub enum ProfileStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "profile store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "profile store query failed: {message}",
    }
}

/// Optional filters applied when listing profiles.
///
/// Unset fields match every profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    pub user_id: Option<UserId>,
    pub tenant_id: Option<TenantId>,
    pub status: Option<ProfileStatus>,
}

impl ProfileFilter {
    /// Profiles owned by `user_id` within `tenant_id`.
    pub fn owner(tenant_id: TenantId, user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            tenant_id: Some(tenant_id),
            status: None,
        }
    }

    /// Profiles in the `active` state.
    pub fn active() -> Self {
        Self {
            status: Some(ProfileStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, profile: &AvailabilityProfile) -> bool {
        self.user_id
            .as_ref()
            .is_none_or(|user_id| profile.user_id() == user_id)
            && self
                .tenant_id
                .as_ref()
                .is_none_or(|tenant_id| profile.tenant_id() == tenant_id)
            && self.status.is_none_or(|status| profile.status() == status)
    }
}

/// Storage for [`AvailabilityProfile`] aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or replace a profile keyed by its id.
    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), ProfileStoreError>;

    async fn find_by_id(&self, id: Uuid)
    -> Result<Option<AvailabilityProfile>, ProfileStoreError>;

    /// Profiles matching `filter`, oldest first.
    async fn list(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, ProfileStoreError>;

    /// Remove a profile. Returns `false` when no profile had that id.
    async fn delete(&self, id: Uuid) -> Result<bool, ProfileStoreError>;
}

/// Fixture store that holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileStore;

#[async_trait]
impl ProfileStore for FixtureProfileStore {
    async fn save(&self, _profile: &AvailabilityProfile) -> Result<(), ProfileStoreError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: Uuid,
    ) -> Result<Option<AvailabilityProfile>, ProfileStoreError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, ProfileStoreError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, ProfileStoreError> {
        Ok(false)
    }
}
