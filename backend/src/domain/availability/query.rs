//! Availability queries: request model, filtering and optimisation.
//!
//! Store access and caching live in the service. This module holds the pure
//! steps applied to a user's slots once they have been loaded.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};

use super::generation::weekday_number;
use super::policy::AvailabilityPolicy;
use super::profile::{UserId, string_enum};
use super::slot::{AvailabilitySlot, SlotStatus};

/// Fewer available slots than this triggers a later-date recommendation.
pub const SPARSE_RESULT_THRESHOLD: usize = 3;

string_enum!(
    /// Coarse local time-of-day preference.
    TimeOfDayBucket, ParseTimeOfDayBucketError, "time of day" {
        Morning => "morning",
        Afternoon => "afternoon",
        Evening => "evening",
    }
);

impl TimeOfDayBucket {
    /// Bucket containing a local hour: morning `[6,12)`, afternoon `[12,17)`,
    /// evening `[17,22)`.
    pub fn for_hour(hour: u32) -> Option<Self> {
        match hour {
            6..=11 => Some(Self::Morning),
            12..=16 => Some(Self::Afternoon),
            17..=21 => Some(Self::Evening),
            _ => None,
        }
    }
}

/// Optional filters and switches for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPreferences {
    /// Accepted buckets; empty accepts any time.
    pub time_of_day: BTreeSet<TimeOfDayBucket>,
    /// Accepted weekday numbers (Sunday is `0`); empty accepts any day.
    pub days_of_week: BTreeSet<u8>,
    /// Report non-available slots as conflicts.
    pub include_unavailable: bool,
    /// Merge adjacent slots during optimisation.
    pub group_consecutive: bool,
    pub max_results: Option<usize>,
}

/// Errors raised when a query is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryValidationError {
    #[error("at least one user id is required")]
    NoUsers,
    #[error("startDate must be before endDate")]
    InvertedRange,
    #[error("duration must be at least one minute")]
    ZeroDuration,
    #[error("weekday {day} is outside 0..=6")]
    InvalidWeekday { day: u8 },
}

/// A multi-user availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQueryRequest {
    pub user_ids: Vec<UserId>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: u32,
    pub meeting_type: Option<String>,
    pub preferences: QueryPreferences,
}

impl AvailabilityQueryRequest {
    pub fn validate(&self) -> Result<(), QueryValidationError> {
        if self.user_ids.is_empty() {
            return Err(QueryValidationError::NoUsers);
        }
        if self.start >= self.end {
            return Err(QueryValidationError::InvertedRange);
        }
        if self.duration_minutes == 0 {
            return Err(QueryValidationError::ZeroDuration);
        }
        if let Some(&day) = self.preferences.days_of_week.iter().find(|day| **day > 6) {
            return Err(QueryValidationError::InvalidWeekday { day });
        }
        Ok(())
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.duration_minutes))
    }

    /// Cache key covering the parts of the request that shape loaded slots.
    pub fn cache_key(&self) -> AvailabilityCacheKey {
        AvailabilityCacheKey {
            user_ids: self
                .user_ids
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            start: self.start,
            end: self.end,
            duration_minutes: self.duration_minutes,
            meeting_type: self.meeting_type.clone(),
        }
    }
}

/// Composite key for cached query snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvailabilityCacheKey {
    pub user_ids: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: u32,
    pub meeting_type: Option<String>,
}

/// A user's slots inside a query window, before preference filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWindowSnapshot {
    pub user_id: UserId,
    /// Every slot in the window, whatever its status.
    pub slots: Vec<AvailabilitySlot>,
    /// Earliest available slot starting at or after the window end.
    pub next_available: Option<AvailabilitySlot>,
}

/// A slot that matched the window but cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub slot_id: uuid::Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SlotStatus,
    pub reason: String,
}

string_enum!(
    /// Kinds of heuristic advice attached to sparse results.
    RecommendationKind, ParseRecommendationKindError, "recommendation kind" {
        ShorterDuration => "shorter_duration",
        LaterDate => "later_date",
    }
);

/// Heuristic suggestion for widening a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub suggested_duration_minutes: Option<u32>,
    pub suggested_date: Option<NaiveDate>,
}

/// Per-user query answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub user_id: UserId,
    pub available_slots: Vec<AvailabilitySlot>,
    pub conflicts: Vec<SlotConflict>,
    pub next_available: Option<AvailabilitySlot>,
    /// Matching slots before the result cap.
    pub total_available: usize,
    pub recommendations: Vec<Recommendation>,
    /// Longest available slot rejected only for being too short, in minutes.
    pub(crate) longest_rejected_minutes: Option<u32>,
}

impl AvailabilityResult {
    /// Sum of current bookings across returned slots.
    pub fn booked_load(&self) -> u64 {
        self.available_slots
            .iter()
            .map(|slot| u64::from(slot.current_bookings()))
            .sum()
    }
}

/// Apply status, duration, meeting-type, preference and advance-booking
/// filters to a snapshot, then cap the result.
pub fn evaluate(
    snapshot: &UserWindowSnapshot,
    request: &AvailabilityQueryRequest,
    policy: &AvailabilityPolicy,
    now: DateTime<Utc>,
) -> AvailabilityResult {
    let earliest_start = now + policy.min_advance_booking;
    let latest_start = now + policy.max_advance_booking;
    let required = request.duration();
    let preferences = &request.preferences;

    let mut matching = Vec::new();
    let mut conflicts = Vec::new();
    let mut longest_rejected: Option<TimeDelta> = None;

    for slot in &snapshot.slots {
        if let Some(reason) = unavailability_reason(slot) {
            if preferences.include_unavailable {
                conflicts.push(SlotConflict {
                    slot_id: slot.id(),
                    start: slot.start(),
                    end: slot.end(),
                    status: slot.status(),
                    reason,
                });
            }
            continue;
        }
        if slot.start() < earliest_start || slot.start() > latest_start {
            continue;
        }
        if !slot.supports_meeting_type(request.meeting_type.as_deref())
            || !matches_preferences(slot, preferences)
        {
            continue;
        }
        if slot.duration() < required {
            longest_rejected = longest_rejected.max(Some(slot.duration()));
            continue;
        }
        matching.push(slot.clone());
    }

    let total_available = matching.len();
    let cap = preferences.max_results.unwrap_or(policy.max_slots_per_query);
    matching.truncate(cap);

    AvailabilityResult {
        user_id: snapshot.user_id.clone(),
        available_slots: matching,
        conflicts,
        next_available: snapshot.next_available.clone(),
        total_available,
        recommendations: Vec::new(),
        longest_rejected_minutes: longest_rejected
            .and_then(|duration| u32::try_from(duration.num_minutes()).ok()),
    }
}

fn unavailability_reason(slot: &AvailabilitySlot) -> Option<String> {
    match slot.status() {
        SlotStatus::Available if slot.current_bookings() < slot.max_bookings() => None,
        SlotStatus::Available | SlotStatus::Booked => Some("slot is fully booked".to_owned()),
        SlotStatus::Blocked => Some("slot is blocked".to_owned()),
        SlotStatus::Tentative => Some("slot is tentatively held".to_owned()),
    }
}

fn matches_preferences(slot: &AvailabilitySlot, preferences: &QueryPreferences) -> bool {
    let local = slot.start().with_timezone(&slot.time_zone());
    let bucket_ok = preferences.time_of_day.is_empty()
        || TimeOfDayBucket::for_hour(local.hour())
            .is_some_and(|bucket| preferences.time_of_day.contains(&bucket));
    let day_ok = preferences.days_of_week.is_empty()
        || preferences
            .days_of_week
            .contains(&weekday_number(local.date_naive()));
    bucket_ok && day_ok
}

/// Optimisation pass over per-user results.
///
/// Users are ordered by descending match count before the cap, adjacent slots
/// are merged when requested and recommendations attached.
pub fn optimize(
    mut results: Vec<AvailabilityResult>,
    request: &AvailabilityQueryRequest,
    policy: &AvailabilityPolicy,
) -> Vec<AvailabilityResult> {
    results.sort_by(|a, b| b.total_available.cmp(&a.total_available));
    for result in &mut results {
        if request.preferences.group_consecutive {
            result.available_slots = merge_consecutive(std::mem::take(&mut result.available_slots));
        }
        result.recommendations = recommend(result, request, policy);
    }
    results
}

/// Merge chronologically adjacent slots of one user.
///
/// Two slots merge when the gap between them is no larger than the first
/// slot's trailing buffer plus the second slot's leading buffer.
pub fn merge_consecutive(mut slots: Vec<AvailabilitySlot>) -> Vec<AvailabilitySlot> {
    slots.sort_by_key(AvailabilitySlot::start);
    let mut merged: Vec<AvailabilitySlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(previous) if is_mergeable(previous, &slot) => {
                *previous = previous.merge_with(&slot);
            }
            _ => merged.push(slot),
        }
    }
    merged
}

fn is_mergeable(previous: &AvailabilitySlot, next: &AvailabilitySlot) -> bool {
    let gap = next.start() - previous.end();
    let allowance = TimeDelta::minutes(i64::from(
        previous
            .buffer_after_minutes()
            .saturating_add(next.buffer_before_minutes()),
    ));
    previous.user_id() == next.user_id() && gap >= TimeDelta::zero() && gap <= allowance
}

fn recommend(
    result: &AvailabilityResult,
    request: &AvailabilityQueryRequest,
    policy: &AvailabilityPolicy,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if result.total_available == 0 {
        let fallback = u32::from(policy.slot_duration_minutes);
        let suggested = result
            .longest_rejected_minutes
            .or_else(|| (request.duration_minutes > fallback).then_some(fallback));
        if let Some(minutes) = suggested {
            recommendations.push(Recommendation {
                kind: RecommendationKind::ShorterDuration,
                message: format!(
                    "No {}-minute slots found; try {minutes} minutes instead",
                    request.duration_minutes
                ),
                suggested_duration_minutes: Some(minutes),
                suggested_date: None,
            });
        }
    }
    let sparse_next = result
        .next_available
        .as_ref()
        .filter(|_| result.total_available < SPARSE_RESULT_THRESHOLD);
    if let Some(next) = sparse_next {
        let date = next.start().with_timezone(&next.time_zone()).date_naive();
        recommendations.push(Recommendation {
            kind: RecommendationKind::LaterDate,
            message: format!("More availability from {date}"),
            suggested_duration_minutes: None,
            suggested_date: Some(date),
        });
    }
    recommendations
}

/// Several independent queries answered together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAvailabilityRequest {
    pub queries: Vec<AvailabilityQueryRequest>,
    /// Prefer users with the lightest current booking load.
    pub load_balance: bool,
    /// Truncate each result's slot list to this many entries.
    pub max_slots_per_query: Option<usize>,
}

/// Cross-query balancing and truncation applied to one query's results.
pub fn balance(
    mut results: Vec<AvailabilityResult>,
    load_balance: bool,
    max_slots: Option<usize>,
) -> Vec<AvailabilityResult> {
    if load_balance {
        results.retain(|result| !result.available_slots.is_empty());
        results.sort_by_key(AvailabilityResult::booked_load);
    }
    if let Some(limit) = max_slots {
        for result in &mut results {
            result.available_slots.truncate(limit);
        }
    }
    results
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
