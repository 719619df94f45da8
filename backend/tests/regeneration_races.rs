//! Scheduled regeneration racing foreground profile writes.
//!
//! The profile store double parks the active-profile listing until the test
//! releases it, so a delete or deactivation lands between the listing and the
//! per-profile regeneration.

use std::sync::Arc;

use async_trait::async_trait;
use meetings_backend::domain::AvailabilityService;
use meetings_backend::domain::availability::{
    AvailabilityPolicy, AvailabilityProfile, ProfileStatus,
};
use meetings_backend::domain::ports::{
    AvailabilityCommand, CreateProfileRequest, ProfileFilter, ProfileStore, ProfileStoreError,
    SlotStore, UpdateProfileRequest,
};
use meetings_backend::outbound::memory::{InMemoryProfileStore, InMemorySlotStore};
use meetings_backend::test_support::availability::{at, fixture_clock, tenant, user, weekday_rules};
use rstest::rstest;
use tokio::sync::Notify;
use uuid::Uuid;

const NOW: &str = "2024-01-01T08:00:00Z";

/// Holds `list(active)` open until [`GatedProfileStore::release`] fires.
#[derive(Default)]
struct GatedProfileStore {
    inner: InMemoryProfileStore,
    listed: Notify,
    release: Notify,
}

#[async_trait]
impl ProfileStore for GatedProfileStore {
    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), ProfileStoreError> {
        self.inner.save(profile).await
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AvailabilityProfile>, ProfileStoreError> {
        self.inner.find_by_id(id).await
    }

    async fn list(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, ProfileStoreError> {
        let profiles = self.inner.list(filter).await?;
        if filter.status == Some(ProfileStatus::Active) {
            self.listed.notify_one();
            self.release.notified().await;
        }
        Ok(profiles)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProfileStoreError> {
        self.inner.delete(id).await
    }
}

#[derive(Debug, Clone, Copy)]
enum Interference {
    Delete,
    Deactivate,
}

#[rstest]
#[case::deleted(Interference::Delete)]
#[case::deactivated(Interference::Deactivate)]
#[tokio::test]
async fn scheduled_regeneration_does_not_resurrect_slots(#[case] interference: Interference) {
    let profiles = Arc::new(GatedProfileStore::default());
    let slots = Arc::new(InMemorySlotStore::new());
    let service = Arc::new(AvailabilityService::new(
        Arc::clone(&profiles),
        Arc::clone(&slots),
        fixture_clock(NOW),
        AvailabilityPolicy::default(),
    ));
    let profile = service
        .create_profile(CreateProfileRequest {
            tenant_id: tenant(),
            user_id: user("user-1"),
            name: "Working hours".to_owned(),
            rules: weekday_rules(),
            status: ProfileStatus::Active,
            is_default: false,
        })
        .await
        .expect("profile is created");

    let tick = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.regenerate_all_active().await }
    });
    profiles.listed.notified().await;

    match interference {
        Interference::Delete => service
            .delete_profile(profile.id())
            .await
            .expect("profile is deleted"),
        Interference::Deactivate => {
            service
                .update_profile(
                    profile.id(),
                    UpdateProfileRequest {
                        status: Some(ProfileStatus::Inactive),
                        ..UpdateProfileRequest::default()
                    },
                )
                .await
                .expect("profile is deactivated");
        }
    }
    profiles.release.notify_one();

    let report = tick
        .await
        .expect("regeneration task joins")
        .expect("regeneration runs");
    assert_eq!(report.profiles, 0);
    assert!(report.failed.is_empty());

    let remaining = slots
        .list_future_for_profile(profile.id(), at(NOW))
        .await
        .expect("slot store answers");
    assert!(remaining.is_empty());
}
