//! Discrete bookable slots and their capacity accounting.
//!
//! `book` and `release` are the only operations that change a slot's booking
//! count outside regeneration.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use super::profile::{UserId, string_enum};

string_enum!(
    /// Booking state of a slot.
    SlotStatus, ParseSlotStatusError, "slot status" {
        Available => "available",
        Booked => "booked",
        Blocked => "blocked",
        Tentative => "tentative",
    }
);

string_enum!(
    /// Which rule produced a slot.
    SlotSource, ParseSlotSourceError, "slot source" {
        Pattern => "pattern",
        Exception => "exception",
        Override => "override",
        Manual => "manual",
    }
);

/// Reasons a booking or release is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotBookingError {
    #[error("slot {slot_id} has no remaining capacity")]
    CapacityExceeded { slot_id: Uuid },
    #[error("slot {slot_id} is {status} and cannot be booked")]
    NotAvailable { slot_id: Uuid, status: SlotStatus },
    #[error("slot {slot_id} does not support meeting type '{meeting_type}'")]
    IncompatibleMeetingType { slot_id: Uuid, meeting_type: String },
    #[error("booking {booking_id} is already recorded on slot {slot_id}")]
    DuplicateBooking { slot_id: Uuid, booking_id: String },
    #[error("booking {booking_id} is not recorded on slot {slot_id}")]
    BookingNotFound { slot_id: Uuid, booking_id: String },
}

/// Input payload for [`AvailabilitySlot::new`].
#[derive(Debug, Clone)]
pub struct SlotDraft {
    pub profile_id: Uuid,
    pub user_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: Tz,
    pub source: SlotSource,
    pub max_bookings: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub meeting_types: Vec<String>,
}

/// A bookable time interval derived from a profile's rules.
///
/// ## Invariants
/// - `current_bookings <= max_bookings` and `max_bookings >= 1`.
/// - `current_bookings == booking_ids.len()`.
/// - Unless blocked or tentative, the status is `booked` exactly when the
///   slot is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySlot {
    id: Uuid,
    profile_id: Uuid,
    user_id: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_zone: Tz,
    status: SlotStatus,
    source: SlotSource,
    max_bookings: u32,
    current_bookings: u32,
    booking_ids: Vec<String>,
    buffer_before_minutes: u32,
    buffer_after_minutes: u32,
    meeting_types: Vec<String>,
}

impl AvailabilitySlot {
    /// Create an empty, available slot with a fresh identifier.
    pub fn new(draft: SlotDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id: draft.profile_id,
            user_id: draft.user_id,
            start: draft.start,
            end: draft.end,
            time_zone: draft.time_zone,
            status: SlotStatus::Available,
            source: draft.source,
            max_bookings: draft.max_bookings.max(1),
            current_bookings: 0,
            booking_ids: Vec::new(),
            buffer_before_minutes: draft.buffer_before_minutes,
            buffer_after_minutes: draft.buffer_after_minutes,
            meeting_types: draft.meeting_types,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Zone of the owning profile, used for local-time filters.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn source(&self) -> SlotSource {
        self.source
    }

    pub fn max_bookings(&self) -> u32 {
        self.max_bookings
    }

    pub fn current_bookings(&self) -> u32 {
        self.current_bookings
    }

    pub fn booking_ids(&self) -> &[String] {
        &self.booking_ids
    }

    pub fn buffer_before_minutes(&self) -> u32 {
        self.buffer_before_minutes
    }

    pub fn buffer_after_minutes(&self) -> u32 {
        self.buffer_after_minutes
    }

    pub fn meeting_types(&self) -> &[String] {
        &self.meeting_types
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        crate::domain::time_of_day::ranges_overlap(self.start, self.end, start, end)
    }

    /// An empty supported-types list accepts every meeting type.
    pub fn supports_meeting_type(&self, meeting_type: Option<&str>) -> bool {
        match meeting_type {
            None => true,
            Some(kind) => {
                self.meeting_types.is_empty() || self.meeting_types.iter().any(|t| t == kind)
            }
        }
    }

    /// Record a booking.
    ///
    /// # Examples
    /// ```
    /// # use meetings_backend::domain::availability::{AvailabilitySlot, SlotDraft, SlotSource, SlotStatus, UserId};
    /// # let start = chrono::Utc::now();
    /// # let mut slot = AvailabilitySlot::new(SlotDraft {
    /// #     profile_id: uuid::Uuid::new_v4(),
    /// #     user_id: UserId::new("user-1").expect("valid user"),
    /// #     start,
    /// #     end: start + chrono::TimeDelta::minutes(30),
    /// #     time_zone: chrono_tz::UTC,
    /// #     source: SlotSource::Manual,
    /// #     max_bookings: 1,
    /// #     buffer_before_minutes: 0,
    /// #     buffer_after_minutes: 0,
    /// #     meeting_types: Vec::new(),
    /// # });
    /// slot.book("booking-1", None).expect("slot has capacity");
    /// assert_eq!(slot.status(), SlotStatus::Booked);
    /// assert!(slot.book("booking-2", None).is_err());
    /// ```
    pub fn book(
        &mut self,
        booking_id: &str,
        meeting_type: Option<&str>,
    ) -> Result<(), SlotBookingError> {
        if self.status == SlotStatus::Booked || self.current_bookings >= self.max_bookings {
            return Err(SlotBookingError::CapacityExceeded { slot_id: self.id });
        }
        if self.status != SlotStatus::Available {
            return Err(SlotBookingError::NotAvailable {
                slot_id: self.id,
                status: self.status,
            });
        }
        if !self.supports_meeting_type(meeting_type) {
            return Err(SlotBookingError::IncompatibleMeetingType {
                slot_id: self.id,
                meeting_type: meeting_type.unwrap_or_default().to_owned(),
            });
        }
        if self.booking_ids.iter().any(|id| id == booking_id) {
            return Err(SlotBookingError::DuplicateBooking {
                slot_id: self.id,
                booking_id: booking_id.to_owned(),
            });
        }
        self.booking_ids.push(booking_id.to_owned());
        self.current_bookings += 1;
        self.refresh_status();
        Ok(())
    }

    /// Remove a previously recorded booking.
    pub fn release(&mut self, booking_id: &str) -> Result<(), SlotBookingError> {
        let position = self
            .booking_ids
            .iter()
            .position(|id| id == booking_id)
            .ok_or_else(|| SlotBookingError::BookingNotFound {
                slot_id: self.id,
                booking_id: booking_id.to_owned(),
            })?;
        self.booking_ids.remove(position);
        self.current_bookings = self.current_bookings.saturating_sub(1);
        self.refresh_status();
        Ok(())
    }

    pub(crate) fn block(&mut self) {
        self.status = SlotStatus::Blocked;
    }

    /// Cap capacity at `limit`, never below one.
    pub(crate) fn limit_capacity(&mut self, limit: u32) {
        self.max_bookings = self.max_bookings.min(limit).max(1);
        self.refresh_status();
    }

    /// Adopt the identity of a slot this one supersedes.
    pub(crate) fn adopt_id(&mut self, id: Uuid) {
        self.id = id;
    }

    /// Merge existing bookings into this slot, raising capacity to fit them.
    pub(crate) fn absorb_bookings<'a>(&mut self, booking_ids: impl IntoIterator<Item = &'a String>) {
        for booking_id in booking_ids {
            if !self.booking_ids.contains(booking_id) {
                self.booking_ids.push(booking_id.clone());
            }
        }
        self.current_bookings = u32::try_from(self.booking_ids.len()).unwrap_or(u32::MAX);
        self.max_bookings = self.max_bookings.max(self.current_bookings);
        self.refresh_status();
    }

    /// Synthetic slot spanning `self` and the following `next` slot.
    ///
    /// Capacities are summed and booking lists concatenated.
    pub(crate) fn merge_with(&self, next: &Self) -> Self {
        let meeting_types = match (self.meeting_types.is_empty(), next.meeting_types.is_empty()) {
            (true, _) => next.meeting_types.clone(),
            (_, true) => self.meeting_types.clone(),
            _ => self
                .meeting_types
                .iter()
                .filter(|kind| next.meeting_types.contains(kind))
                .cloned()
                .collect(),
        };
        let mut booking_ids = self.booking_ids.clone();
        booking_ids.extend(next.booking_ids.iter().cloned());
        let mut merged = Self {
            id: Uuid::new_v4(),
            profile_id: self.profile_id,
            user_id: self.user_id.clone(),
            start: self.start,
            end: next.end.max(self.end),
            time_zone: self.time_zone,
            status: SlotStatus::Available,
            source: self.source,
            max_bookings: self.max_bookings.saturating_add(next.max_bookings),
            current_bookings: self.current_bookings.saturating_add(next.current_bookings),
            booking_ids,
            buffer_before_minutes: self.buffer_before_minutes,
            buffer_after_minutes: next.buffer_after_minutes,
            meeting_types,
        };
        merged.refresh_status();
        merged
    }

    fn refresh_status(&mut self) {
        if matches!(self.status, SlotStatus::Available | SlotStatus::Booked) {
            self.status = if self.current_bookings >= self.max_bookings {
                SlotStatus::Booked
            } else {
                SlotStatus::Available
            };
        }
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
