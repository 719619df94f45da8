//! Runtime policy governing slot generation and queries.

use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::domain::time_of_day::{TimeOfDay, WallClockRange};

/// Validated engine configuration.
///
/// Built from settings at startup; every value here is already in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    /// Zone applied to profiles created without one.
    pub default_time_zone: Tz,
    /// Fallback range for `available` exceptions without explicit times.
    pub default_working_hours: WallClockRange,
    /// Buffer applied to slots that do not come from a pattern.
    pub default_buffer_minutes: u32,
    /// Latest bookable start, relative to now.
    pub max_advance_booking: TimeDelta,
    /// Earliest bookable start, relative to now.
    pub min_advance_booking: TimeDelta,
    /// Number of local days covered by regeneration, starting today.
    pub generation_window_days: u16,
    /// Increment used when walking a time range into slots.
    pub slot_duration_minutes: u16,
    pub max_slots_per_query: usize,
    pub cache_enabled: bool,
    pub cache_ttl: std::time::Duration,
    pub optimization_enabled: bool,
    pub allow_overlapping_slots: bool,
}

impl AvailabilityPolicy {
    pub fn slot_duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.slot_duration_minutes))
    }
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            default_time_zone: chrono_tz::UTC,
            default_working_hours: WallClockRange {
                start: TimeOfDay::from_minutes(9 * 60).unwrap_or(TimeOfDay::MIDNIGHT),
                end: TimeOfDay::from_minutes(17 * 60).unwrap_or(TimeOfDay::END_OF_DAY),
            },
            default_buffer_minutes: 0,
            max_advance_booking: TimeDelta::days(90),
            min_advance_booking: TimeDelta::zero(),
            generation_window_days: 30,
            slot_duration_minutes: 30,
            max_slots_per_query: 100,
            cache_enabled: true,
            cache_ttl: std::time::Duration::from_secs(5 * 60),
            optimization_enabled: true,
            allow_overlapping_slots: false,
        }
    }
}
