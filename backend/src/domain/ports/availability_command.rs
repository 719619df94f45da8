//! Driving port for availability mutations.
//!
//! HTTP handlers, the regeneration scheduler and the booking workflow call
//! this port. Every mutation that changes a profile's rules regenerates the
//! profile's future slots before returning.

use async_trait::async_trait;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::availability::{
    AvailabilityException, AvailabilityOverride, AvailabilityProfile, AvailabilityRules,
    AvailabilitySlot, ProfileStatus, ProfileTemplate, TenantId, UserId,
};

/// Request to create a profile from explicit rules.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProfileRequest {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub name: String,
    pub rules: AvailabilityRules,
    pub status: ProfileStatus,
    /// Ask for this profile to become the user's default. The user's first
    /// profile becomes the default regardless.
    pub is_default: bool,
}

/// Request to create a profile from a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFromTemplateRequest {
    pub template: ProfileTemplate,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    /// Defaults to the template's display name.
    pub name: Option<String>,
    /// Defaults to the configured zone.
    pub time_zone: Option<Tz>,
}

/// Partial profile update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub rules: Option<AvailabilityRules>,
    pub status: Option<ProfileStatus>,
    pub is_default: Option<bool>,
}

impl UpdateProfileRequest {
    /// Whether applying the update requires regenerating slots.
    pub fn affects_slots(&self) -> bool {
        self.rules.is_some() || self.status.is_some()
    }
}

/// Request to record a booking on a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSlotRequest {
    pub slot_id: Uuid,
    pub booking_id: String,
    pub meeting_type: Option<String>,
}

/// Request to remove a booking from a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSlotRequest {
    pub slot_id: Uuid,
    pub booking_id: String,
}

/// Outcome of regenerating one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationSummary {
    pub profile_id: Uuid,
    /// Future slots stored after regeneration.
    pub slot_count: usize,
}

/// Outcome of regenerating every active profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    pub profiles: usize,
    pub slots: usize,
    /// Profiles whose regeneration failed.
    pub failed: Vec<Uuid>,
}

/// Driving port for availability mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityCommand: Send + Sync {
    /// Create a profile and generate its slots.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the rules are malformed.
    async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<AvailabilityProfile, Error>;

    async fn create_profile_from_template(
        &self,
        request: CreateFromTemplateRequest,
    ) -> Result<AvailabilityProfile, Error>;

    /// Apply a partial update. Rule or status changes regenerate slots.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown profiles.
    async fn update_profile(
        &self,
        profile_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<AvailabilityProfile, Error>;

    /// Delete a profile together with all of its slots.
    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), Error>;

    async fn add_exception(
        &self,
        profile_id: Uuid,
        exception: AvailabilityException,
    ) -> Result<AvailabilityProfile, Error>;

    async fn add_override(
        &self,
        profile_id: Uuid,
        rule: AvailabilityOverride,
    ) -> Result<AvailabilityProfile, Error>;

    async fn regenerate_profile(&self, profile_id: Uuid) -> Result<RegenerationSummary, Error>;

    /// Regenerate slots for every active profile.
    ///
    /// A failing profile is recorded in the report; the run continues.
    async fn regenerate_all_active(&self) -> Result<RegenerationReport, Error>;

    /// Record a booking on a slot.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the slot is unknown.
    /// - `CapacityExceeded` when the slot is full.
    /// - `Conflict` when the slot is blocked or already holds the booking.
    /// - `InvalidRequest` when the meeting type is not supported.
    async fn book_slot(&self, request: BookSlotRequest) -> Result<AvailabilitySlot, Error>;

    /// Remove a booking from a slot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the slot or booking is unknown.
    async fn release_slot(&self, request: ReleaseSlotRequest) -> Result<AvailabilitySlot, Error>;
}
