//! Wall-clock time-of-day primitives.
//!
//! Working hours, breaks and patterns are expressed as `HH:MM` strings in the
//! profile's local time zone. Parsing is strict so a malformed value can never
//! silently become midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Errors raised when parsing a [`TimeOfDay`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeOfDayParseError {
    /// The value was not of the form `HH:MM`.
    #[error("time of day '{value}' must use the HH:MM format")]
    Format { value: String },
    /// Hours or minutes fell outside the clock face.
    #[error("time of day '{value}' is out of range")]
    OutOfRange { value: String },
}

/// Minutes since local midnight, in the closed range `00:00..=24:00`.
///
/// `24:00` is accepted so a range can end exactly at the end of the day.
///
/// # Examples
/// ```
/// use meetings_backend::domain::TimeOfDay;
///
/// let nine: TimeOfDay = "09:00".parse().expect("valid time");
/// assert_eq!(nine.minutes_from_midnight(), 540);
/// assert_eq!(nine.to_string(), "09:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Local midnight at the start of the day.
    pub const MIDNIGHT: Self = Self(0);
    /// Local midnight at the end of the day.
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Build from hours and minutes, rejecting values off the clock face.
    pub fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        let total = hours.checked_mul(60)?.checked_add(minutes)?;
        (minutes < 60 && total <= MINUTES_PER_DAY).then_some(Self(total))
    }

    /// Build from minutes since midnight, rejecting values past `24:00`.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Minutes elapsed since local midnight.
    pub fn minutes_from_midnight(self) -> u16 {
        self.0
    }

    /// Hour component, `0..=24`.
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Time of day of a naive local timestamp.
    pub fn of(time: NaiveTime) -> Self {
        // hour() < 24 and minute() < 60 always hold for NaiveTime.
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    /// Anchor this time of day on a calendar date.
    ///
    /// `24:00` resolves to midnight of the following day.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + TimeDelta::minutes(i64::from(self.0))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let format_error = || TimeOfDayParseError::Format {
            value: value.to_owned(),
        };
        let (hours, minutes) = value.split_once(':').ok_or_else(format_error)?;
        let is_two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !is_two_digits(hours) || !is_two_digits(minutes) {
            return Err(format_error());
        }
        let hours: u16 = hours.parse().map_err(|_| format_error())?;
        let minutes: u16 = minutes.parse().map_err(|_| format_error())?;
        Self::from_hm(hours, minutes).ok_or_else(|| TimeOfDayParseError::OutOfRange {
            value: value.to_owned(),
        })
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Half-open wall-clock interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClockRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl WallClockRange {
    /// Build a range, returning `None` when it is empty or inverted.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Intersection of two ranges, `None` when they do not overlap.
    pub fn intersect(self, other: Self) -> Option<Self> {
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Half-open overlap test.
    pub fn overlaps(self, other: Self) -> bool {
        ranges_overlap(self.start, self.end, other.start, other.end)
    }
}

/// Half-open overlap test over any ordered values: `a_start < b_end && a_end > b_start`.
pub fn ranges_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(value: &str) -> TimeOfDay {
        value.parse().expect("valid time of day")
    }

    #[rstest]
    #[case("00:00", 0)]
    #[case("09:30", 570)]
    #[case("23:59", 1439)]
    #[case("24:00", 1440)]
    fn parses_valid_values(#[case] raw: &str, #[case] minutes: u16) {
        assert_eq!(t(raw).minutes_from_midnight(), minutes);
        assert_eq!(t(raw).to_string(), raw);
    }

    #[rstest]
    #[case("9:00")]
    #[case("09:0")]
    #[case("0900")]
    #[case("")]
    #[case("ab:cd")]
    #[case("+9:00")]
    fn rejects_malformed_values(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<TimeOfDay>(),
            Err(TimeOfDayParseError::Format { .. })
        ));
    }

    #[rstest]
    #[case("24:01")]
    #[case("25:00")]
    #[case("12:60")]
    fn rejects_out_of_range_values(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<TimeOfDay>(),
            Err(TimeOfDayParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn end_of_day_rolls_into_next_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let next = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
        assert_eq!(TimeOfDay::END_OF_DAY.on(date), next.and_time(NaiveTime::MIN));
    }

    #[rstest]
    #[case(("09:00", "17:00"), ("08:00", "12:00"), Some(("09:00", "12:00")))]
    #[case(("09:00", "17:00"), ("17:00", "18:00"), None)]
    #[case(("09:00", "17:00"), ("10:00", "11:00"), Some(("10:00", "11:00")))]
    fn intersects_ranges(
        #[case] a: (&str, &str),
        #[case] b: (&str, &str),
        #[case] expected: Option<(&str, &str)>,
    ) {
        let a = WallClockRange::new(t(a.0), t(a.1)).expect("non-empty");
        let b = WallClockRange::new(t(b.0), t(b.1)).expect("non-empty");
        let expected = expected.map(|(s, e)| WallClockRange {
            start: t(s),
            end: t(e),
        });
        assert_eq!(a.intersect(b), expected);
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        assert!(!ranges_overlap(t("11:30"), t("12:00"), t("12:00"), t("13:00")));
        assert!(ranges_overlap(t("11:45"), t("12:15"), t("12:00"), t("13:00")));
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(WallClockRange::new(t("10:00"), t("09:00")).is_none());
        assert!(WallClockRange::new(t("10:00"), t("10:00")).is_none());
    }
}
