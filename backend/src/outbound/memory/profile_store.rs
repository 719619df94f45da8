//! `RwLock`-guarded map implementing [`ProfileStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::availability::AvailabilityProfile;
use crate::domain::ports::{ProfileFilter, ProfileStore, ProfileStoreError};

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, AvailabilityProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), ProfileStoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.id(), profile.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AvailabilityProfile>, ProfileStoreError> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, ProfileStoreError> {
        let guard = self.profiles.read().await;
        let mut matching: Vec<AvailabilityProfile> = guard
            .values()
            .filter(|profile| filter.matches(profile))
            .cloned()
            .collect();
        matching.sort_by_key(|profile| (profile.created_at(), profile.id()));
        Ok(matching)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProfileStoreError> {
        Ok(self.profiles.write().await.remove(&id).is_some())
    }
}
