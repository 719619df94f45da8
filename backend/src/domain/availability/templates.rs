//! Preset rule sets for quickly creating profiles.

use std::collections::BTreeSet;

use chrono_tz::Tz;
use uuid::Uuid;

use super::profile::{
    AvailabilityPattern, AvailabilityRules, PatternKind, WorkingHours, string_enum,
};
use crate::domain::time_of_day::TimeOfDay;

string_enum!(
    /// Named working-hours presets.
    ProfileTemplate, ParseProfileTemplateError, "profile template" {
        Standard => "standard",
        Extended => "extended",
        PartTime => "part_time",
    }
);

struct TemplateShape {
    display_name: &'static str,
    days: &'static [u8],
    start: u16,
    end: u16,
    lunch: Option<(u16, u16)>,
}

impl ProfileTemplate {
    fn shape(self) -> TemplateShape {
        match self {
            Self::Standard => TemplateShape {
                display_name: "Standard business hours",
                days: &[1, 2, 3, 4, 5],
                start: 9 * 60,
                end: 17 * 60,
                lunch: Some((12 * 60, 13 * 60)),
            },
            Self::Extended => TemplateShape {
                display_name: "Extended hours",
                days: &[1, 2, 3, 4, 5],
                start: 8 * 60,
                end: 20 * 60,
                lunch: Some((12 * 60, 13 * 60)),
            },
            Self::PartTime => TemplateShape {
                display_name: "Part-time mornings",
                days: &[1, 2, 3, 4],
                start: 9 * 60,
                end: 13 * 60,
                lunch: None,
            },
        }
    }

    /// Default profile name for the template.
    pub fn display_name(self) -> &'static str {
        self.shape().display_name
    }

    /// Build the template's rules in `time_zone`.
    ///
    /// Buffers on the generated pattern use `buffer_minutes`.
    pub fn rules(self, time_zone: Tz, buffer_minutes: u32) -> AvailabilityRules {
        let shape = self.shape();
        let minutes = |value: u16| TimeOfDay::from_minutes(value).unwrap_or(TimeOfDay::MIDNIGHT);
        let start = minutes(shape.start);
        let end = minutes(shape.end);

        let mut rules = AvailabilityRules::empty(time_zone);
        for &day in shape.days {
            let mut hours = WorkingHours::new(start, end);
            if let Some((lunch_start, lunch_end)) = shape.lunch {
                hours = hours.with_break(minutes(lunch_start), minutes(lunch_end), Some("Lunch"));
            }
            rules.working_hours.insert(day, hours);
        }
        rules.patterns.push(AvailabilityPattern {
            id: Uuid::new_v4(),
            name: shape.display_name.to_owned(),
            kind: PatternKind::Available,
            days_of_week: shape.days.iter().copied().collect::<BTreeSet<u8>>(),
            start_time: start,
            end_time: end,
            valid_from: None,
            valid_until: None,
            max_bookings_per_slot: 1,
            buffer_before_minutes: buffer_minutes,
            buffer_after_minutes: buffer_minutes,
            meeting_types: Vec::new(),
        });
        rules
    }
}
