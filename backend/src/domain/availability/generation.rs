//! Expansion of profile rules into concrete slots.
//!
//! Generation is a pure function of the profile, the profile's current future
//! slots and "now". Rules are applied in a fixed order: patterns, blackout
//! patterns, exceptions, then overrides. Later stages win over earlier ones.
//!
//! All wall-clock values are interpreted in the profile's zone and converted
//! to UTC instants. Local times that do not exist (DST gaps) are skipped;
//! ambiguous local times resolve to the earliest instant.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use super::policy::AvailabilityPolicy;
use super::profile::{
    AvailabilityException, AvailabilityOverride, AvailabilityPattern, AvailabilityProfile,
    ExceptionKind, OverrideKind, PatternKind, WorkingHours,
};
use super::slot::{AvailabilitySlot, SlotDraft, SlotSource};
use crate::domain::time_of_day::{TimeOfDay, WallClockRange};

/// Weekday number with Sunday as `0`.
pub fn weekday_number(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always < 7.
    date.weekday().num_days_from_sunday() as u8
}

/// Resolve a local wall-clock time to a UTC instant.
pub fn local_instant(tz: Tz, date: NaiveDate, time: TimeOfDay) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&time.on(date))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// The span covered by one regeneration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationWindow {
    /// First local day of the window (today in the profile's zone).
    pub first_day: NaiveDate,
    /// First local day after the window.
    pub end_day: NaiveDate,
    /// Instant at which the window starts; slots before it are history.
    pub start: DateTime<Utc>,
    /// Instant at which the window ends.
    pub end: DateTime<Utc>,
}

impl GenerationWindow {
    pub fn contains_day(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date < self.end_day
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first_day
            .iter_days()
            .take_while(move |day| *day < self.end_day)
    }
}

/// Expands profiles into slots according to an [`AvailabilityPolicy`].
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    policy: AvailabilityPolicy,
}

impl SlotGenerator {
    pub fn new(policy: AvailabilityPolicy) -> Self {
        Self { policy }
    }

    /// Window covered by a regeneration of `profile` at `now`.
    pub fn window(&self, profile: &AvailabilityProfile, now: DateTime<Utc>) -> GenerationWindow {
        let tz = profile.time_zone();
        let first_day = now.with_timezone(&tz).date_naive();
        let end_day = first_day + TimeDelta::days(i64::from(self.policy.generation_window_days));
        let end = local_instant(tz, end_day, TimeOfDay::MIDNIGHT).unwrap_or_else(|| {
            now + TimeDelta::days(i64::from(self.policy.generation_window_days))
        });
        GenerationWindow {
            first_day,
            end_day,
            start: now,
            end,
        }
    }

    /// Build the complete future slot set for `profile`.
    ///
    /// `existing_future` holds the profile's slots starting at or after `now`.
    /// Slots whose exact interval reappears keep their identity and bookings.
    /// The result is sorted by start time.
    pub fn generate(
        &self,
        profile: &AvailabilityProfile,
        existing_future: &[AvailabilitySlot],
        now: DateTime<Utc>,
    ) -> Vec<AvailabilitySlot> {
        let window = self.window(profile, now);
        let mut run = GenerationRun {
            policy: &self.policy,
            profile,
            window,
            slots: Vec::new(),
        };

        run.expand_patterns();
        run.apply_blackouts();
        for exception in &profile.rules().exceptions {
            run.apply_exception(exception);
        }
        for rule in &profile.rules().overrides {
            run.apply_override(rule, existing_future);
        }

        let mut slots = carry_forward(run.slots, existing_future);
        slots.sort_by_key(|slot| (slot.start(), slot.end()));
        slots
    }
}

struct GenerationRun<'a> {
    policy: &'a AvailabilityPolicy,
    profile: &'a AvailabilityProfile,
    window: GenerationWindow,
    slots: Vec<AvailabilitySlot>,
}

/// Slot-shaping attributes shared by every slot a rule produces.
struct SlotTemplate<'a> {
    source: SlotSource,
    max_bookings: u32,
    buffer_before_minutes: u32,
    buffer_after_minutes: u32,
    meeting_types: &'a [String],
}

impl GenerationRun<'_> {
    fn tz(&self) -> Tz {
        self.profile.time_zone()
    }

    fn expand_patterns(&mut self) {
        let profile = self.profile;
        let rules = profile.rules();
        let available: Vec<&AvailabilityPattern> = rules
            .patterns
            .iter()
            .filter(|pattern| pattern.kind == PatternKind::Available)
            .collect();
        let days: Vec<NaiveDate> = self.window.days().collect();

        for date in days {
            let weekday = weekday_number(date);
            let Some(hours) = rules.working_hours.get(&weekday) else {
                continue;
            };
            let Some(working) = hours.range() else {
                continue;
            };

            if available.is_empty() {
                // Without explicit patterns the working hours themselves are bookable.
                let template = SlotTemplate {
                    source: SlotSource::Pattern,
                    max_bookings: 1,
                    buffer_before_minutes: self.policy.default_buffer_minutes,
                    buffer_after_minutes: self.policy.default_buffer_minutes,
                    meeting_types: &[],
                };
                self.walk(date, working, Some(hours), &template);
                continue;
            }

            for pattern in &available {
                if !pattern.applies_on(date, weekday) {
                    continue;
                }
                let Some(effective) = pattern.range().and_then(|range| range.intersect(working))
                else {
                    continue;
                };
                let template = SlotTemplate {
                    source: SlotSource::Pattern,
                    max_bookings: pattern.max_bookings_per_slot,
                    buffer_before_minutes: pattern.buffer_before_minutes,
                    buffer_after_minutes: pattern.buffer_after_minutes,
                    meeting_types: &pattern.meeting_types,
                };
                self.walk(date, effective, Some(hours), &template);
            }
        }
    }

    fn apply_blackouts(&mut self) {
        let tz = self.tz();
        let window = self.window;
        let blackouts: Vec<(DateTime<Utc>, DateTime<Utc>)> = self
            .profile
            .rules()
            .patterns
            .iter()
            .filter(|pattern| pattern.kind == PatternKind::Blackout)
            .flat_map(|pattern| {
                window.days().filter_map(move |date| {
                    if !pattern.applies_on(date, weekday_number(date)) {
                        return None;
                    }
                    let range = pattern.range()?;
                    Some((
                        local_instant(tz, date, range.start)?,
                        local_instant(tz, date, range.end)?,
                    ))
                })
            })
            .collect();

        for (start, end) in blackouts {
            self.slots
                .iter_mut()
                .filter(|slot| slot.overlaps(start, end))
                .for_each(AvailabilitySlot::block);
        }
    }

    fn apply_exception(&mut self, exception: &AvailabilityException) {
        if !self.window.contains_day(exception.date) {
            return;
        }
        let tz = self.tz();
        match exception.kind {
            ExceptionKind::Unavailable | ExceptionKind::Limited => {
                let range = exception.range().unwrap_or(WallClockRange {
                    start: TimeOfDay::MIDNIGHT,
                    end: TimeOfDay::END_OF_DAY,
                });
                let (Some(start), Some(end)) = (
                    local_instant(tz, exception.date, range.start),
                    local_instant(tz, exception.date, range.end),
                ) else {
                    return;
                };
                let limit = exception.max_bookings;
                for slot in self.slots.iter_mut().filter(|slot| slot.overlaps(start, end)) {
                    match (exception.kind, limit) {
                        (ExceptionKind::Limited, Some(limit)) => slot.limit_capacity(limit),
                        _ => slot.block(),
                    }
                }
            }
            ExceptionKind::Available => {
                let range = exception
                    .range()
                    .unwrap_or(self.policy.default_working_hours);
                let template = SlotTemplate {
                    source: SlotSource::Exception,
                    max_bookings: exception.max_bookings.unwrap_or(1),
                    buffer_before_minutes: self.policy.default_buffer_minutes,
                    buffer_after_minutes: self.policy.default_buffer_minutes,
                    meeting_types: &[],
                };
                self.walk(exception.date, range, None, &template);
            }
        }
    }

    fn apply_override(&mut self, rule: &AvailabilityOverride, existing: &[AvailabilitySlot]) {
        if !crate::domain::time_of_day::ranges_overlap(
            rule.start,
            rule.end,
            self.window.start,
            self.window.end,
        ) {
            return;
        }
        self.slots.retain(|slot| !slot.overlaps(rule.start, rule.end));

        if rule.kind != OverrideKind::Available || rule.start < self.window.start {
            return;
        }
        let mut slot = AvailabilitySlot::new(SlotDraft {
            profile_id: self.profile.id(),
            user_id: self.profile.user_id().clone(),
            start: rule.start,
            end: rule.end,
            time_zone: self.tz(),
            source: SlotSource::Override,
            max_bookings: rule.max_bookings.unwrap_or(1),
            buffer_before_minutes: self.policy.default_buffer_minutes,
            buffer_after_minutes: self.policy.default_buffer_minutes,
            meeting_types: Vec::new(),
        });
        slot.absorb_bookings(
            existing
                .iter()
                .filter(|old| old.overlaps(rule.start, rule.end))
                .flat_map(|old| old.booking_ids()),
        );
        self.slots.push(slot);
    }

    /// Walk `range` on `date` in fixed increments, emitting one slot per step.
    ///
    /// Steps overlapping a break of `hours` are skipped, as are steps that
    /// start before the window or that collide with existing slots when
    /// overlaps are disallowed.
    fn walk(
        &mut self,
        date: NaiveDate,
        range: WallClockRange,
        hours: Option<&WorkingHours>,
        template: &SlotTemplate<'_>,
    ) {
        let step = self.policy.slot_duration_minutes;
        if step == 0 {
            return;
        }
        let tz = self.tz();
        let breaks: Vec<WallClockRange> = hours
            .map(|hours| hours.breaks.iter().filter_map(|b| b.range()).collect())
            .unwrap_or_default();

        let mut cursor = range.start.minutes_from_midnight();
        let limit = range.end.minutes_from_midnight();
        while let Some(next) = cursor.checked_add(step).filter(|next| *next <= limit) {
            let candidate = TimeOfDay::from_minutes(cursor)
                .zip(TimeOfDay::from_minutes(next))
                .and_then(|(start, end)| WallClockRange::new(start, end));
            cursor = next;
            let Some(candidate) = candidate else {
                continue;
            };
            if breaks.iter().any(|interval| interval.overlaps(candidate)) {
                continue;
            }
            let (Some(start), Some(end)) = (
                local_instant(tz, date, candidate.start),
                local_instant(tz, date, candidate.end),
            ) else {
                continue;
            };
            if start < self.window.start || end <= start {
                continue;
            }
            if !self.policy.allow_overlapping_slots
                && self.slots.iter().any(|slot| slot.overlaps(start, end))
            {
                continue;
            }
            self.slots.push(AvailabilitySlot::new(SlotDraft {
                profile_id: self.profile.id(),
                user_id: self.profile.user_id().clone(),
                start,
                end,
                time_zone: tz,
                source: template.source,
                max_bookings: template.max_bookings,
                buffer_before_minutes: template.buffer_before_minutes,
                buffer_after_minutes: template.buffer_after_minutes,
                meeting_types: template.meeting_types.to_vec(),
            }));
        }
    }
}

/// Reuse identity and bookings of previous slots whose interval reappears.
fn carry_forward(
    mut slots: Vec<AvailabilitySlot>,
    existing: &[AvailabilitySlot],
) -> Vec<AvailabilitySlot> {
    let mut previous: HashMap<(DateTime<Utc>, DateTime<Utc>), &AvailabilitySlot> = existing
        .iter()
        .map(|slot| ((slot.start(), slot.end()), slot))
        .collect();
    for slot in &mut slots {
        if let Some(old) = previous.remove(&(slot.start(), slot.end())) {
            slot.adopt_id(old.id());
            slot.absorb_bookings(old.booking_ids());
        }
    }
    slots
}

/// Booking identifiers on `existing` slots that no generated slot retains.
pub fn dropped_bookings(
    existing: &[AvailabilitySlot],
    generated: &[AvailabilitySlot],
) -> Vec<(Uuid, String)> {
    existing
        .iter()
        .flat_map(|old| {
            old.booking_ids()
                .iter()
                .map(move |booking_id| (old.id(), booking_id.clone()))
        })
        .filter(|(_, booking_id)| {
            !generated
                .iter()
                .any(|slot| slot.booking_ids().contains(booking_id))
        })
        .collect()
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod tests;
