//! Availability rule DTOs and parsing helpers.
//!
//! The same shapes are accepted in requests and returned in responses. Rule
//! ids are optional on input and generated when absent.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::availability::{
    AvailabilityException, AvailabilityOverride, AvailabilityPattern, AvailabilityRules,
    BookingPreference, BreakInterval, ExceptionKind, OverrideKind, PatternKind, WorkingHours,
};
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_enum, parse_optional_date, parse_optional_time,
    parse_rfc3339_timestamp, parse_time, parse_time_zone, parse_uuid, parse_weekday,
};

const fn enabled() -> bool {
    true
}

const fn one() -> u32 {
    1
}

fn available() -> String {
    PatternKind::Available.as_str().to_owned()
}

/// Rule set of a profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesBody {
    /// IANA zone; the configured default applies when omitted.
    #[schema(example = "Europe/London")]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub working_hours: Vec<WorkingHoursBody>,
    #[serde(default)]
    pub patterns: Vec<PatternBody>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionBody>,
    #[serde(default)]
    pub overrides: Vec<OverrideBody>,
    /// Preferences keyed by meeting type.
    #[serde(default)]
    pub booking_preferences: BTreeMap<String, BookingPreferenceBody>,
}

/// Working hours for one weekday (0 = Sunday).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursBody {
    pub day: u8,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[schema(example = "09:00")]
    pub start: String,
    #[schema(example = "17:00")]
    pub end: String,
    #[serde(default)]
    pub breaks: Vec<BreakBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakBody {
    pub start: String,
    pub end: String,
    pub label: Option<String>,
}

/// Recurring weekly pattern.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternBody {
    #[schema(format = "uuid")]
    pub id: Option<String>,
    pub name: String,
    /// `available` or `blackout`.
    #[serde(default = "available")]
    pub kind: String,
    pub days_of_week: Vec<u8>,
    pub start_time: String,
    pub end_time: String,
    #[schema(format = "date")]
    pub valid_from: Option<String>,
    #[schema(format = "date")]
    pub valid_until: Option<String>,
    #[serde(default = "one")]
    pub max_bookings_per_slot: u32,
    #[serde(default)]
    pub buffer_before_minutes: u32,
    #[serde(default)]
    pub buffer_after_minutes: u32,
    #[serde(default)]
    pub meeting_types: Vec<String>,
}

/// Single-day exception.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionBody {
    #[schema(format = "uuid")]
    pub id: Option<String>,
    #[schema(format = "date")]
    pub date: String,
    /// `unavailable`, `limited` or `available`.
    pub kind: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_bookings: Option<u32>,
    pub reason: Option<String>,
}

/// Absolute-datetime override.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverrideBody {
    #[schema(format = "uuid")]
    pub id: Option<String>,
    #[schema(format = "date-time")]
    pub start: String,
    #[schema(format = "date-time")]
    pub end: String,
    /// `available` or `unavailable`.
    pub kind: String,
    pub max_bookings: Option<u32>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreferenceBody {
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub buffer_before_minutes: u32,
    #[serde(default)]
    pub buffer_after_minutes: u32,
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub requires_approval: bool,
}

fn parse_rule_id(id: Option<&str>, field: FieldName) -> Result<Uuid, Error> {
    id.map_or_else(|| Ok(Uuid::new_v4()), |raw| parse_uuid(raw, field))
}

impl RulesBody {
    /// Convert into domain rules, using `default_time_zone` when unset.
    pub(crate) fn into_rules(self, default_time_zone: Tz) -> Result<AvailabilityRules, Error> {
        let time_zone = match self.time_zone.as_deref() {
            Some(raw) => parse_time_zone(raw, FieldName::new("timeZone"))?,
            None => default_time_zone,
        };
        let mut rules = AvailabilityRules::empty(time_zone);
        for body in self.working_hours {
            let day = parse_weekday(body.day, FieldName::new("workingHours.day"))?;
            rules.working_hours.insert(day, body.into_working_hours()?);
        }
        rules.patterns = self
            .patterns
            .into_iter()
            .map(PatternBody::into_pattern)
            .collect::<Result<_, _>>()?;
        rules.exceptions = self
            .exceptions
            .into_iter()
            .map(ExceptionBody::into_exception)
            .collect::<Result<_, _>>()?;
        rules.overrides = self
            .overrides
            .into_iter()
            .map(OverrideBody::into_override)
            .collect::<Result<_, _>>()?;
        rules.booking_preferences = self
            .booking_preferences
            .into_iter()
            .map(|(meeting_type, body)| (meeting_type, body.into()))
            .collect();
        Ok(rules)
    }
}

impl WorkingHoursBody {
    fn into_working_hours(self) -> Result<WorkingHours, Error> {
        let breaks = self
            .breaks
            .into_iter()
            .map(|body| {
                Ok(BreakInterval {
                    start: parse_time(&body.start, FieldName::new("breaks.start"))?,
                    end: parse_time(&body.end, FieldName::new("breaks.end"))?,
                    label: body.label,
                })
            })
            .collect::<Result<_, Error>>()?;
        Ok(WorkingHours {
            enabled: self.enabled,
            start: parse_time(&self.start, FieldName::new("workingHours.start"))?,
            end: parse_time(&self.end, FieldName::new("workingHours.end"))?,
            breaks,
        })
    }
}

impl PatternBody {
    fn into_pattern(self) -> Result<AvailabilityPattern, Error> {
        let days_of_week = self
            .days_of_week
            .into_iter()
            .map(|day| parse_weekday(day, FieldName::new("patterns.daysOfWeek")))
            .collect::<Result<_, _>>()?;
        Ok(AvailabilityPattern {
            id: parse_rule_id(self.id.as_deref(), FieldName::new("patterns.id"))?,
            name: self.name,
            kind: parse_enum::<PatternKind>(&self.kind, FieldName::new("patterns.kind"))?,
            days_of_week,
            start_time: parse_time(&self.start_time, FieldName::new("patterns.startTime"))?,
            end_time: parse_time(&self.end_time, FieldName::new("patterns.endTime"))?,
            valid_from: parse_optional_date(
                self.valid_from.as_deref(),
                FieldName::new("patterns.validFrom"),
            )?,
            valid_until: parse_optional_date(
                self.valid_until.as_deref(),
                FieldName::new("patterns.validUntil"),
            )?,
            max_bookings_per_slot: self.max_bookings_per_slot,
            buffer_before_minutes: self.buffer_before_minutes,
            buffer_after_minutes: self.buffer_after_minutes,
            meeting_types: self.meeting_types,
        })
    }
}

impl ExceptionBody {
    pub(crate) fn into_exception(self) -> Result<AvailabilityException, Error> {
        Ok(AvailabilityException {
            id: parse_rule_id(self.id.as_deref(), FieldName::new("id"))?,
            date: parse_date(&self.date, FieldName::new("date"))?,
            kind: parse_enum::<ExceptionKind>(&self.kind, FieldName::new("kind"))?,
            start_time: parse_optional_time(self.start_time.as_deref(), FieldName::new("startTime"))?,
            end_time: parse_optional_time(self.end_time.as_deref(), FieldName::new("endTime"))?,
            max_bookings: self.max_bookings,
            reason: self.reason,
        })
    }
}

impl OverrideBody {
    pub(crate) fn into_override(self) -> Result<AvailabilityOverride, Error> {
        Ok(AvailabilityOverride {
            id: parse_rule_id(self.id.as_deref(), FieldName::new("id"))?,
            start: parse_rfc3339_timestamp(&self.start, FieldName::new("start"))?,
            end: parse_rfc3339_timestamp(&self.end, FieldName::new("end"))?,
            kind: parse_enum::<OverrideKind>(&self.kind, FieldName::new("kind"))?,
            max_bookings: self.max_bookings,
            reason: self.reason,
        })
    }
}

impl From<BookingPreferenceBody> for BookingPreference {
    fn from(value: BookingPreferenceBody) -> Self {
        Self {
            duration_minutes: value.duration_minutes,
            buffer_before_minutes: value.buffer_before_minutes,
            buffer_after_minutes: value.buffer_after_minutes,
            max_per_day: value.max_per_day,
            requires_approval: value.requires_approval,
        }
    }
}

impl From<&AvailabilityRules> for RulesBody {
    fn from(rules: &AvailabilityRules) -> Self {
        Self {
            time_zone: Some(rules.time_zone.name().to_owned()),
            working_hours: rules
                .working_hours
                .iter()
                .map(|(&day, hours)| WorkingHoursBody {
                    day,
                    enabled: hours.enabled,
                    start: hours.start.to_string(),
                    end: hours.end.to_string(),
                    breaks: hours
                        .breaks
                        .iter()
                        .map(|interval| BreakBody {
                            start: interval.start.to_string(),
                            end: interval.end.to_string(),
                            label: interval.label.clone(),
                        })
                        .collect(),
                })
                .collect(),
            patterns: rules.patterns.iter().map(PatternBody::from).collect(),
            exceptions: rules.exceptions.iter().map(ExceptionBody::from).collect(),
            overrides: rules.overrides.iter().map(OverrideBody::from).collect(),
            booking_preferences: rules
                .booking_preferences
                .iter()
                .map(|(meeting_type, preference)| {
                    (
                        meeting_type.clone(),
                        BookingPreferenceBody {
                            duration_minutes: preference.duration_minutes,
                            buffer_before_minutes: preference.buffer_before_minutes,
                            buffer_after_minutes: preference.buffer_after_minutes,
                            max_per_day: preference.max_per_day,
                            requires_approval: preference.requires_approval,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl From<&AvailabilityPattern> for PatternBody {
    fn from(pattern: &AvailabilityPattern) -> Self {
        Self {
            id: Some(pattern.id.to_string()),
            name: pattern.name.clone(),
            kind: pattern.kind.as_str().to_owned(),
            days_of_week: pattern.days_of_week.iter().copied().collect(),
            start_time: pattern.start_time.to_string(),
            end_time: pattern.end_time.to_string(),
            valid_from: pattern.valid_from.map(|date| date.to_string()),
            valid_until: pattern.valid_until.map(|date| date.to_string()),
            max_bookings_per_slot: pattern.max_bookings_per_slot,
            buffer_before_minutes: pattern.buffer_before_minutes,
            buffer_after_minutes: pattern.buffer_after_minutes,
            meeting_types: pattern.meeting_types.clone(),
        }
    }
}

impl From<&AvailabilityException> for ExceptionBody {
    fn from(exception: &AvailabilityException) -> Self {
        Self {
            id: Some(exception.id.to_string()),
            date: exception.date.to_string(),
            kind: exception.kind.as_str().to_owned(),
            start_time: exception.start_time.map(|time| time.to_string()),
            end_time: exception.end_time.map(|time| time.to_string()),
            max_bookings: exception.max_bookings,
            reason: exception.reason.clone(),
        }
    }
}

impl From<&AvailabilityOverride> for OverrideBody {
    fn from(rule: &AvailabilityOverride) -> Self {
        Self {
            id: Some(rule.id.to_string()),
            start: rule.start.to_rfc3339(),
            end: rule.end.to_rfc3339(),
            kind: rule.kind.as_str().to_owned(),
            max_bookings: rule.max_bookings,
            reason: rule.reason.clone(),
        }
    }
}
