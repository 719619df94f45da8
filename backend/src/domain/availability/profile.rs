//! Availability profile aggregate and the rule types it owns.
//!
//! A profile is the source of truth for a user's availability. Slots are
//! derived from it and rebuilt whenever its rules change.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::domain::time_of_day::{TimeOfDay, WallClockRange};

/// Weekday number of Saturday; Sunday is `0`.
pub const MAX_WEEKDAY: u8 = 6;

/// Validation errors raised by profile constructors and mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("weekday {day} is outside 0..=6")]
    InvalidWeekday { day: u8 },
    #[error("{context}: start {start} must be before end {end}")]
    InvertedRange {
        context: String,
        start: String,
        end: String,
    },
    #[error("pattern '{name}' must apply to at least one weekday")]
    PatternWithoutDays { name: String },
    #[error("pattern '{name}' validity window ends before it starts")]
    InvertedValidity { name: String },
    #[error("{context}: max bookings must be at least 1")]
    ZeroCapacity { context: String },
    #[error("limited exception on {date} requires max bookings")]
    LimitedWithoutCapacity { date: NaiveDate },
    #[error("exception on {date} must set both start and end time or neither")]
    PartialExceptionRange { date: NaiveDate },
    #[error("break {start}-{end} on weekday {day} falls outside working hours")]
    BreakOutsideWorkingHours {
        day: u8,
        start: TimeOfDay,
        end: TimeOfDay,
    },
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, ProfileValidationError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ProfileValidationError::Blank { field: $field });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_identifier!(
    /// Identifier of the user who owns a profile and its slots.
    UserId,
    "userId"
);
string_identifier!(
    /// Identifier of the tenant a profile belongs to.
    TenantId,
    "tenantId"
);

/// A labelled pause inside a working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakInterval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub label: Option<String>,
}

impl BreakInterval {
    /// Wall-clock range covered by the break, `None` when inverted.
    pub fn range(&self) -> Option<WallClockRange> {
        WallClockRange::new(self.start, self.end)
    }
}

/// Working hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHours {
    pub enabled: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub breaks: Vec<BreakInterval>,
}

impl WorkingHours {
    /// Enabled working hours without breaks.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            enabled: true,
            start,
            end,
            breaks: Vec::new(),
        }
    }

    /// Add a break interval.
    #[must_use]
    pub fn with_break(mut self, start: TimeOfDay, end: TimeOfDay, label: Option<&str>) -> Self {
        self.breaks.push(BreakInterval {
            start,
            end,
            label: label.map(str::to_owned),
        });
        self
    }

    /// The working range, `None` when disabled.
    pub fn range(&self) -> Option<WallClockRange> {
        if !self.enabled {
            return None;
        }
        WallClockRange::new(self.start, self.end)
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $error:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        /// Error returned when parsing an unknown value.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $error(pub String);

        impl ::std::fmt::Display for $error {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "unknown {} '{}'", $label, self.0)
            }
        }

        impl ::std::error::Error for $error {}

        impl $name {
            /// Stable wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err($error(other.to_owned())),
                }
            }
        }
    };
}

pub(crate) use string_enum;

string_enum!(
    /// Whether a pattern opens availability or blacks it out.
    PatternKind, ParsePatternKindError, "pattern kind" {
        Available => "available",
        Blackout => "blackout",
    }
);

string_enum!(
    /// Effect of a dated exception.
    ExceptionKind, ParseExceptionKindError, "exception kind" {
        Unavailable => "unavailable",
        Limited => "limited",
        Available => "available",
    }
);

string_enum!(
    /// Effect of an absolute-datetime override.
    OverrideKind, ParseOverrideKindError, "override kind" {
        Available => "available",
        Unavailable => "unavailable",
    }
);

string_enum!(
    /// Lifecycle status of a profile.
    ProfileStatus, ParseProfileStatusError, "profile status" {
        Active => "active",
        Inactive => "inactive",
        Draft => "draft",
    }
);

/// A recurring availability rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPattern {
    pub id: Uuid,
    pub name: String,
    pub kind: PatternKind,
    pub days_of_week: BTreeSet<u8>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub max_bookings_per_slot: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub meeting_types: Vec<String>,
}

impl AvailabilityPattern {
    /// Whether the pattern applies on `date`, whose weekday number is `weekday`.
    pub fn applies_on(&self, date: NaiveDate, weekday: u8) -> bool {
        self.days_of_week.contains(&weekday)
            && self.valid_from.is_none_or(|from| date >= from)
            && self.valid_until.is_none_or(|until| date <= until)
    }

    /// Wall-clock range of the pattern.
    pub fn range(&self) -> Option<WallClockRange> {
        WallClockRange::new(self.start_time, self.end_time)
    }

    fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProfileValidationError::Blank {
                field: "pattern name",
            });
        }
        if self.days_of_week.is_empty() {
            return Err(ProfileValidationError::PatternWithoutDays {
                name: self.name.clone(),
            });
        }
        if let Some(&day) = self.days_of_week.iter().find(|day| **day > MAX_WEEKDAY) {
            return Err(ProfileValidationError::InvalidWeekday { day });
        }
        ensure_ordered(
            || format!("pattern '{}'", self.name),
            self.start_time,
            self.end_time,
        )?;
        if matches!((self.valid_from, self.valid_until), (Some(from), Some(until)) if until < from) {
            return Err(ProfileValidationError::InvertedValidity {
                name: self.name.clone(),
            });
        }
        if self.max_bookings_per_slot == 0 {
            return Err(ProfileValidationError::ZeroCapacity {
                context: format!("pattern '{}'", self.name),
            });
        }
        Ok(())
    }
}

/// A single-day change to normal availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub max_bookings: Option<u32>,
    pub reason: Option<String>,
}

impl AvailabilityException {
    /// Wall-clock range the exception is bounded to, `None` for the whole day.
    pub fn range(&self) -> Option<WallClockRange> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => WallClockRange::new(start, end),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ProfileValidationError> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                ensure_ordered(|| format!("exception on {}", self.date), start, end)?;
            }
            (None, None) => {}
            _ => return Err(ProfileValidationError::PartialExceptionRange { date: self.date }),
        }
        match (self.kind, self.max_bookings) {
            (ExceptionKind::Limited, None) => {
                Err(ProfileValidationError::LimitedWithoutCapacity { date: self.date })
            }
            (_, Some(0)) => Err(ProfileValidationError::ZeroCapacity {
                context: format!("exception on {}", self.date),
            }),
            _ => Ok(()),
        }
    }
}

/// An absolute-datetime rule that bypasses patterns and exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityOverride {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: OverrideKind,
    pub max_bookings: Option<u32>,
    pub reason: Option<String>,
}

impl AvailabilityOverride {
    pub(crate) fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.start >= self.end {
            return Err(ProfileValidationError::InvertedRange {
                context: "override".to_owned(),
                start: self.start.to_rfc3339(),
                end: self.end.to_rfc3339(),
            });
        }
        if self.max_bookings == Some(0) {
            return Err(ProfileValidationError::ZeroCapacity {
                context: "override".to_owned(),
            });
        }
        Ok(())
    }
}

/// Booking preferences for one meeting type. Stored with the profile for
/// downstream booking workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPreference {
    pub duration_minutes: Option<u32>,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub max_per_day: Option<u32>,
    pub requires_approval: bool,
}

/// The rule set from which slots are generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRules {
    pub time_zone: Tz,
    pub working_hours: BTreeMap<u8, WorkingHours>,
    pub patterns: Vec<AvailabilityPattern>,
    pub exceptions: Vec<AvailabilityException>,
    pub overrides: Vec<AvailabilityOverride>,
    pub booking_preferences: BTreeMap<String, BookingPreference>,
}

impl AvailabilityRules {
    /// Empty rule set in the given zone.
    pub fn empty(time_zone: Tz) -> Self {
        Self {
            time_zone,
            working_hours: BTreeMap::new(),
            patterns: Vec::new(),
            exceptions: Vec::new(),
            overrides: Vec::new(),
            booking_preferences: BTreeMap::new(),
        }
    }

    /// Check every structural invariant of the rule set.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        for (&day, hours) in &self.working_hours {
            if day > MAX_WEEKDAY {
                return Err(ProfileValidationError::InvalidWeekday { day });
            }
            ensure_ordered(
                || format!("working hours on weekday {day}"),
                hours.start,
                hours.end,
            )?;
            for interval in &hours.breaks {
                ensure_ordered(
                    || format!("break on weekday {day}"),
                    interval.start,
                    interval.end,
                )?;
                if interval.start < hours.start || interval.end > hours.end {
                    return Err(ProfileValidationError::BreakOutsideWorkingHours {
                        day,
                        start: interval.start,
                        end: interval.end,
                    });
                }
            }
        }
        self.patterns.iter().try_for_each(AvailabilityPattern::validate)?;
        self.exceptions
            .iter()
            .try_for_each(AvailabilityException::validate)?;
        self.overrides
            .iter()
            .try_for_each(AvailabilityOverride::validate)
    }
}

fn ensure_ordered(
    context: impl FnOnce() -> String,
    start: TimeOfDay,
    end: TimeOfDay,
) -> Result<(), ProfileValidationError> {
    if start < end {
        return Ok(());
    }
    Err(ProfileValidationError::InvertedRange {
        context: context(),
        start: start.to_string(),
        end: end.to_string(),
    })
}

/// Input payload for [`AvailabilityProfile::new`].
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub name: String,
    pub rules: AvailabilityRules,
    pub status: ProfileStatus,
    pub is_default: bool,
}

/// A user's availability definition.
///
/// ## Invariants
/// - `name` is non-blank.
/// - `rules` satisfy [`AvailabilityRules::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityProfile {
    id: Uuid,
    tenant_id: TenantId,
    user_id: UserId,
    name: String,
    rules: AvailabilityRules,
    status: ProfileStatus,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AvailabilityProfile {
    /// Validate a draft into a profile created at `now`.
    pub fn new(draft: ProfileDraft, now: DateTime<Utc>) -> Result<Self, ProfileValidationError> {
        let name = validated_name(draft.name)?;
        draft.rules.validate()?;
        Ok(Self {
            id: draft.id,
            tenant_id: draft.tenant_id,
            user_id: draft.user_id,
            name,
            rules: draft.rules,
            status: draft.status,
            is_default: draft.is_default,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn rules(&self) -> &AvailabilityRules {
        &self.rules
    }

    pub fn time_zone(&self) -> Tz {
        self.rules.time_zone
    }

    pub fn status(&self) -> ProfileStatus {
        self.status
    }

    /// Whether slots should be generated for this profile.
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rename the profile.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileValidationError> {
        self.name = validated_name(name.into())?;
        self.updated_at = now;
        Ok(())
    }

    /// Replace the whole rule set.
    pub fn replace_rules(
        &mut self,
        rules: AvailabilityRules,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileValidationError> {
        rules.validate()?;
        self.rules = rules;
        self.updated_at = now;
        Ok(())
    }

    /// Append a dated exception.
    pub fn add_exception(
        &mut self,
        exception: AvailabilityException,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileValidationError> {
        exception.validate()?;
        self.rules.exceptions.push(exception);
        self.updated_at = now;
        Ok(())
    }

    /// Append an absolute-datetime override.
    pub fn add_override(
        &mut self,
        rule: AvailabilityOverride,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileValidationError> {
        rule.validate()?;
        self.rules.overrides.push(rule);
        self.updated_at = now;
        Ok(())
    }

    pub fn set_status(&mut self, status: ProfileStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn set_default(&mut self, is_default: bool, now: DateTime<Utc>) {
        self.is_default = is_default;
        self.updated_at = now;
    }
}

fn validated_name(name: String) -> Result<String, ProfileValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProfileValidationError::Blank { field: "name" });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
