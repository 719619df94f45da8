//! Availability domain service implementing the driving ports.
//!
//! The service owns orchestration only: rule expansion, filtering and
//! capacity accounting live in [`crate::domain::availability`]. Every
//! mutation runs under one async mutex so bookings, releases and
//! regeneration of the same slots never interleave.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::availability::{
    AvailabilityEvent, AvailabilityException, AvailabilityOverride, AvailabilityPolicy,
    AvailabilityProfile, AvailabilityQueryRequest, AvailabilityResult, AvailabilitySlot,
    BulkAvailabilityRequest, EventContext, ProfileDraft, ProfileStatus, SlotGenerator,
    UserWindowSnapshot, balance, dropped_bookings, evaluate, optimize,
};
use crate::domain::availability_service_support::{
    map_booking_error, map_profile_store_error, map_profile_validation_error,
    map_query_validation_error, map_slot_store_error, profile_not_found, slot_not_found,
};
use crate::domain::ports::{
    AvailabilityCache, AvailabilityCommand, AvailabilityEventPublisher, AvailabilityQuery,
    BookSlotRequest, CreateFromTemplateRequest, CreateProfileRequest, NoOpAvailabilityCache,
    NoOpEventPublisher, ProfileFilter, ProfileStore, RegenerationReport, RegenerationSummary,
    ReleaseSlotRequest, SlotStore, UpdateProfileRequest,
};

/// Availability service implementing [`AvailabilityCommand`] and
/// [`AvailabilityQuery`].
pub struct AvailabilityService<P, S> {
    profiles: Arc<P>,
    slots: Arc<S>,
    cache: Arc<dyn AvailabilityCache>,
    events: Arc<dyn AvailabilityEventPublisher>,
    clock: Arc<dyn Clock>,
    policy: AvailabilityPolicy,
    generator: SlotGenerator,
    writes: Mutex<()>,
}

impl<P, S> AvailabilityService<P, S> {
    /// Create a service without caching or event delivery.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use meetings_backend::domain::AvailabilityService;
    /// # use meetings_backend::domain::availability::AvailabilityPolicy;
    /// # use meetings_backend::outbound::memory::{InMemoryProfileStore, InMemorySlotStore};
    /// # use mockable::DefaultClock;
    /// let service = AvailabilityService::new(
    ///     Arc::new(InMemoryProfileStore::new()),
    ///     Arc::new(InMemorySlotStore::new()),
    ///     Arc::new(DefaultClock),
    ///     AvailabilityPolicy::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        profiles: Arc<P>,
        slots: Arc<S>,
        clock: Arc<dyn Clock>,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            profiles,
            slots,
            cache: Arc::new(NoOpAvailabilityCache),
            events: Arc::new(NoOpEventPublisher),
            clock,
            generator: SlotGenerator::new(policy.clone()),
            policy,
            writes: Mutex::new(()),
        }
    }

    /// Read query snapshots through `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn AvailabilityCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Publish lifecycle events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn AvailabilityEventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn policy(&self) -> &AvailabilityPolicy {
        &self.policy
    }
}

impl<P, S> AvailabilityService<P, S>
where
    P: ProfileStore,
    S: SlotStore,
{
    async fn load_profile(&self, profile_id: Uuid) -> Result<AvailabilityProfile, Error> {
        self.profiles
            .find_by_id(profile_id)
            .await
            .map_err(map_profile_store_error)?
            .ok_or_else(|| profile_not_found(profile_id))
    }

    async fn load_slot(&self, slot_id: Uuid) -> Result<AvailabilitySlot, Error> {
        self.slots
            .find_by_id(slot_id)
            .await
            .map_err(map_slot_store_error)?
            .ok_or_else(|| slot_not_found(slot_id))
    }

    async fn save_profile(&self, profile: &AvailabilityProfile) -> Result<(), Error> {
        self.profiles
            .save(profile)
            .await
            .map_err(map_profile_store_error)
    }

    async fn publish(&self, event: AvailabilityEvent) {
        let name = event.name();
        if let Err(err) = self.events.publish(event).await {
            warn!(event = name, error = %err, "failed to publish availability event");
        }
    }

    /// Clear the default flag on the owner's other profiles.
    async fn demote_other_defaults(
        &self,
        profile: &AvailabilityProfile,
        siblings: Vec<AvailabilityProfile>,
    ) -> Result<(), Error> {
        let now = self.clock.utc();
        for mut sibling in siblings {
            if sibling.id() == profile.id() || !sibling.is_default() {
                continue;
            }
            sibling.set_default(false, now);
            self.save_profile(&sibling).await?;
            debug!(
                profile_id = %sibling.id(),
                user_id = %sibling.user_id(),
                "demoted previous default profile"
            );
        }
        Ok(())
    }

    async fn owner_profiles(
        &self,
        profile: &AvailabilityProfile,
    ) -> Result<Vec<AvailabilityProfile>, Error> {
        self.profiles
            .list(&ProfileFilter::owner(
                profile.tenant_id().clone(),
                profile.user_id().clone(),
            ))
            .await
            .map_err(map_profile_store_error)
    }

    /// Rebuild the profile's future slots. Callers hold the write lock.
    ///
    /// Inactive and draft profiles lose their future slots.
    async fn regenerate_slots(
        &self,
        profile: &AvailabilityProfile,
    ) -> Result<RegenerationSummary, Error> {
        let now = self.clock.utc();
        let existing = self
            .slots
            .list_future_for_profile(profile.id(), now)
            .await
            .map_err(map_slot_store_error)?;
        let generated = if profile.is_active() {
            self.generator.generate(profile, &existing, now)
        } else {
            Vec::new()
        };

        for (slot_id, booking_id) in dropped_bookings(&existing, &generated) {
            warn!(
                profile_id = %profile.id(),
                slot_id = %slot_id,
                booking_id = %booking_id,
                "regeneration dropped a slot holding a booking"
            );
        }

        let slot_count = generated.len();
        self.slots
            .replace_future_for_profile(profile.id(), now, generated)
            .await
            .map_err(map_slot_store_error)?;
        info!(
            profile_id = %profile.id(),
            user_id = %profile.user_id(),
            slot_count,
            replaced = existing.len(),
            "regenerated availability slots"
        );
        self.publish(AvailabilityEvent::SlotsRegenerated {
            profile_id: profile.id(),
            user_id: profile.user_id().clone(),
            slot_count,
            context: EventContext::capture(now),
        })
        .await;

        Ok(RegenerationSummary {
            profile_id: profile.id(),
            slot_count,
        })
    }

    /// Persist a rule change, regenerate and announce the update.
    async fn commit_rule_change(
        &self,
        profile: AvailabilityProfile,
    ) -> Result<AvailabilityProfile, Error> {
        self.save_profile(&profile).await?;
        self.regenerate_slots(&profile).await?;
        self.publish(AvailabilityEvent::ProfileUpdated {
            profile_id: profile.id(),
            user_id: profile.user_id().clone(),
            context: EventContext::capture(self.clock.utc()),
        })
        .await;
        Ok(profile)
    }

    async fn load_snapshots(
        &self,
        request: &AvailabilityQueryRequest,
    ) -> Result<Vec<UserWindowSnapshot>, Error> {
        let key = request.cache_key();
        if self.policy.cache_enabled {
            match self.cache.get(&key).await {
                Ok(Some(snapshots)) => {
                    debug!(users = request.user_ids.len(), "availability cache hit");
                    return Ok(snapshots);
                }
                Ok(None) => debug!(users = request.user_ids.len(), "availability cache miss"),
                Err(err) => warn!(error = %err, "availability cache read failed"),
            }
        }

        let mut snapshots = Vec::with_capacity(request.user_ids.len());
        for user_id in &request.user_ids {
            let slots = self
                .slots
                .find_for_user_in_range(user_id, request.start, request.end)
                .await
                .map_err(map_slot_store_error)?;
            let next_available = self
                .slots
                .find_next_available_after(user_id, request.end)
                .await
                .map_err(map_slot_store_error)?;
            snapshots.push(UserWindowSnapshot {
                user_id: user_id.clone(),
                slots,
                next_available,
            });
        }

        if self.policy.cache_enabled {
            if let Err(err) = self.cache.put(&key, snapshots.clone()).await {
                warn!(error = %err, "availability cache write failed");
            }
        }
        Ok(snapshots)
    }
}

#[async_trait]
impl<P, S> AvailabilityCommand for AvailabilityService<P, S>
where
    P: ProfileStore,
    S: SlotStore,
{
    async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<AvailabilityProfile, Error> {
        let _writes = self.writes.lock().await;
        let now = self.clock.utc();
        let siblings = self
            .profiles
            .list(&ProfileFilter::owner(
                request.tenant_id.clone(),
                request.user_id.clone(),
            ))
            .await
            .map_err(map_profile_store_error)?;
        let is_default = request.is_default || siblings.is_empty();

        let profile = AvailabilityProfile::new(
            ProfileDraft {
                id: Uuid::new_v4(),
                tenant_id: request.tenant_id,
                user_id: request.user_id,
                name: request.name,
                rules: request.rules,
                status: request.status,
                is_default,
            },
            now,
        )
        .map_err(map_profile_validation_error)?;

        if is_default {
            self.demote_other_defaults(&profile, siblings).await?;
        }
        self.save_profile(&profile).await?;
        info!(
            profile_id = %profile.id(),
            user_id = %profile.user_id(),
            is_default,
            "availability profile created"
        );
        self.publish(AvailabilityEvent::ProfileCreated {
            profile_id: profile.id(),
            tenant_id: profile.tenant_id().clone(),
            user_id: profile.user_id().clone(),
            context: EventContext::capture(now),
        })
        .await;

        if profile.is_active() {
            self.regenerate_slots(&profile).await?;
        }
        Ok(profile)
    }

    async fn create_profile_from_template(
        &self,
        request: CreateFromTemplateRequest,
    ) -> Result<AvailabilityProfile, Error> {
        let time_zone = request.time_zone.unwrap_or(self.policy.default_time_zone);
        let name = request
            .name
            .unwrap_or_else(|| request.template.display_name().to_owned());
        debug!(template = %request.template, "creating profile from template");
        self.create_profile(CreateProfileRequest {
            tenant_id: request.tenant_id,
            user_id: request.user_id,
            name,
            rules: request
                .template
                .rules(time_zone, self.policy.default_buffer_minutes),
            status: ProfileStatus::Active,
            is_default: false,
        })
        .await
    }

    async fn update_profile(
        &self,
        profile_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<AvailabilityProfile, Error> {
        let _writes = self.writes.lock().await;
        let now = self.clock.utc();
        let mut profile = self.load_profile(profile_id).await?;
        let regenerate = request.affects_slots();

        if let Some(name) = request.name {
            profile
                .rename(name, now)
                .map_err(map_profile_validation_error)?;
        }
        if let Some(rules) = request.rules {
            profile
                .replace_rules(rules, now)
                .map_err(map_profile_validation_error)?;
        }
        if let Some(status) = request.status {
            profile.set_status(status, now);
        }
        match request.is_default {
            Some(true) if !profile.is_default() => {
                let siblings = self.owner_profiles(&profile).await?;
                self.demote_other_defaults(&profile, siblings).await?;
                profile.set_default(true, now);
            }
            Some(false) => profile.set_default(false, now),
            _ => {}
        }

        if regenerate {
            return self.commit_rule_change(profile).await;
        }
        self.save_profile(&profile).await?;
        info!(profile_id = %profile.id(), "availability profile updated");
        self.publish(AvailabilityEvent::ProfileUpdated {
            profile_id: profile.id(),
            user_id: profile.user_id().clone(),
            context: EventContext::capture(now),
        })
        .await;
        Ok(profile)
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), Error> {
        let _writes = self.writes.lock().await;
        let profile = self.load_profile(profile_id).await?;
        let removed_slots = self
            .slots
            .delete_for_profile(profile_id)
            .await
            .map_err(map_slot_store_error)?;
        let removed = self
            .profiles
            .delete(profile_id)
            .await
            .map_err(map_profile_store_error)?;
        if !removed {
            return Err(profile_not_found(profile_id));
        }
        info!(
            profile_id = %profile_id,
            user_id = %profile.user_id(),
            removed_slots,
            "availability profile deleted"
        );
        self.publish(AvailabilityEvent::ProfileDeleted {
            profile_id,
            user_id: profile.user_id().clone(),
            context: EventContext::capture(self.clock.utc()),
        })
        .await;
        Ok(())
    }

    async fn add_exception(
        &self,
        profile_id: Uuid,
        exception: AvailabilityException,
    ) -> Result<AvailabilityProfile, Error> {
        let _writes = self.writes.lock().await;
        let mut profile = self.load_profile(profile_id).await?;
        profile
            .add_exception(exception, self.clock.utc())
            .map_err(map_profile_validation_error)?;
        self.commit_rule_change(profile).await
    }

    async fn add_override(
        &self,
        profile_id: Uuid,
        rule: AvailabilityOverride,
    ) -> Result<AvailabilityProfile, Error> {
        let _writes = self.writes.lock().await;
        let mut profile = self.load_profile(profile_id).await?;
        profile
            .add_override(rule, self.clock.utc())
            .map_err(map_profile_validation_error)?;
        self.commit_rule_change(profile).await
    }

    async fn regenerate_profile(&self, profile_id: Uuid) -> Result<RegenerationSummary, Error> {
        let _writes = self.writes.lock().await;
        let profile = self.load_profile(profile_id).await?;
        self.regenerate_slots(&profile).await
    }

    async fn regenerate_all_active(&self) -> Result<RegenerationReport, Error> {
        let profiles = self
            .profiles
            .list(&ProfileFilter::active())
            .await
            .map_err(map_profile_store_error)?;

        let mut report = RegenerationReport::default();
        for profile_id in profiles.iter().map(AvailabilityProfile::id) {
            let _writes = self.writes.lock().await;
            // The listing is stale once other writers have run; re-read under the lock.
            let current = match self.profiles.find_by_id(profile_id).await {
                Ok(Some(profile)) if profile.is_active() => profile,
                Ok(_) => {
                    debug!(profile_id = %profile_id, "profile gone or inactive; skipping regeneration");
                    continue;
                }
                Err(err) => {
                    let err = map_profile_store_error(err);
                    warn!(profile_id = %profile_id, error = %err, "profile reload failed");
                    report.failed.push(profile_id);
                    continue;
                }
            };
            match self.regenerate_slots(&current).await {
                Ok(summary) => {
                    report.profiles += 1;
                    report.slots += summary.slot_count;
                }
                Err(err) => {
                    warn!(profile_id = %profile_id, error = %err, "profile regeneration failed");
                    report.failed.push(profile_id);
                }
            }
        }
        info!(
            profiles = report.profiles,
            slots = report.slots,
            failed = report.failed.len(),
            "regenerated all active profiles"
        );
        Ok(report)
    }

    async fn book_slot(&self, request: BookSlotRequest) -> Result<AvailabilitySlot, Error> {
        let _writes = self.writes.lock().await;
        let mut slot = self.load_slot(request.slot_id).await?;
        slot.book(&request.booking_id, request.meeting_type.as_deref())
            .map_err(map_booking_error)?;
        self.slots.save(&slot).await.map_err(map_slot_store_error)?;
        info!(
            slot_id = %slot.id(),
            booking_id = %request.booking_id,
            current_bookings = slot.current_bookings(),
            max_bookings = slot.max_bookings(),
            "slot booked"
        );
        self.publish(AvailabilityEvent::SlotBooked {
            slot_id: slot.id(),
            booking_id: request.booking_id,
            user_id: slot.user_id().clone(),
            context: EventContext::capture(self.clock.utc()),
        })
        .await;
        Ok(slot)
    }

    async fn release_slot(&self, request: ReleaseSlotRequest) -> Result<AvailabilitySlot, Error> {
        let _writes = self.writes.lock().await;
        let mut slot = self.load_slot(request.slot_id).await?;
        slot.release(&request.booking_id)
            .map_err(map_booking_error)?;
        self.slots.save(&slot).await.map_err(map_slot_store_error)?;
        info!(
            slot_id = %slot.id(),
            booking_id = %request.booking_id,
            current_bookings = slot.current_bookings(),
            "slot released"
        );
        self.publish(AvailabilityEvent::SlotReleased {
            slot_id: slot.id(),
            booking_id: request.booking_id,
            user_id: slot.user_id().clone(),
            context: EventContext::capture(self.clock.utc()),
        })
        .await;
        Ok(slot)
    }
}

#[async_trait]
impl<P, S> AvailabilityQuery for AvailabilityService<P, S>
where
    P: ProfileStore,
    S: SlotStore,
{
    async fn get_profile(&self, profile_id: Uuid) -> Result<AvailabilityProfile, Error> {
        self.load_profile(profile_id).await
    }

    async fn list_profiles(
        &self,
        filter: ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, Error> {
        self.profiles
            .list(&filter)
            .await
            .map_err(map_profile_store_error)
    }

    async fn get_slot(&self, slot_id: Uuid) -> Result<AvailabilitySlot, Error> {
        self.load_slot(slot_id).await
    }

    async fn query(
        &self,
        request: AvailabilityQueryRequest,
    ) -> Result<Vec<AvailabilityResult>, Error> {
        request.validate().map_err(map_query_validation_error)?;
        let snapshots = self.load_snapshots(&request).await?;
        let now = self.clock.utc();
        let results: Vec<AvailabilityResult> = snapshots
            .iter()
            .map(|snapshot| evaluate(snapshot, &request, &self.policy, now))
            .collect();
        if !self.policy.optimization_enabled {
            return Ok(results);
        }
        Ok(optimize(results, &request, &self.policy))
    }

    async fn bulk_query(
        &self,
        request: BulkAvailabilityRequest,
    ) -> Result<Vec<Vec<AvailabilityResult>>, Error> {
        let BulkAvailabilityRequest {
            queries,
            load_balance,
            max_slots_per_query,
        } = request;
        debug!(queries = queries.len(), load_balance, "running bulk availability query");
        let answers = try_join_all(queries.into_iter().map(|query| self.query(query))).await?;
        Ok(answers
            .into_iter()
            .map(|results| balance(results, load_balance, max_slots_per_query))
            .collect())
    }
}

#[cfg(test)]
#[path = "availability_service_tests.rs"]
mod tests;
