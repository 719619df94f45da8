//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AVAILABILITY_*`/`SERVER_*` environment
//! variables or a config file, in that order of precedence. Unset values fall
//! back to the defaults below. [`AvailabilitySettings::policy`] validates the
//! raw values into an [`AvailabilityPolicy`].

use chrono::TimeDelta;
use chrono_tz::Tz;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::availability::AvailabilityPolicy;
use crate::domain::{TimeOfDay, TimeOfDayParseError, WallClockRange};

const DEFAULT_TIME_ZONE: &str = "UTC";
const DEFAULT_WORKING_HOURS_START: &str = "09:00";
const DEFAULT_WORKING_HOURS_END: &str = "17:00";
const DEFAULT_MAX_ADVANCE_BOOKING_DAYS: u32 = 90;
const DEFAULT_SLOT_GENERATION_WINDOW_DAYS: u16 = 30;
const DEFAULT_SLOT_DURATION_MINUTES: u16 = 30;
const MAX_SLOT_DURATION_MINUTES: u16 = 24 * 60;
const DEFAULT_MAX_SLOTS_PER_QUERY: usize = 100;
const DEFAULT_CACHE_TTL_MINUTES: u64 = 5;
const DEFAULT_REGENERATION_CRON: &str = "0 0 0 * * *";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Invalid configuration values. Startup aborts on any of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown time zone '{0}'")]
    TimeZone(String),
    #[error("invalid default working hours: {0}")]
    WorkingHours(#[from] TimeOfDayParseError),
    #[error("default working hours must start before they end")]
    InvertedWorkingHours,
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: u64 },
}

/// Availability engine settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AVAILABILITY")]
pub struct AvailabilitySettings {
    /// IANA zone for profiles created without one.
    pub default_time_zone: Option<String>,
    /// `HH:MM` start of the fallback working day.
    pub default_working_hours_start: Option<String>,
    pub default_working_hours_end: Option<String>,
    pub default_buffer_minutes: Option<u32>,
    pub max_advance_booking_days: Option<u32>,
    pub min_advance_booking_hours: Option<u32>,
    pub slot_generation_window_days: Option<u16>,
    pub slot_duration_minutes: Option<u16>,
    pub max_slots_per_query: Option<usize>,
    #[ortho_config(default = true)]
    pub cache_enabled: bool,
    pub cache_ttl_minutes: Option<u64>,
    #[ortho_config(default = true)]
    pub optimization_enabled: bool,
    #[ortho_config(default = false)]
    pub allow_overlapping_slots: bool,
    /// Six-field cron expression for the regeneration job.
    pub regeneration_cron: Option<String>,
}

fn at_least_one<T>(value: Option<T>, default: T, field: &'static str) -> Result<T, SettingsError>
where
    T: PartialOrd + From<u8>,
{
    let value = value.unwrap_or(default);
    if value < T::from(1) {
        return Err(SettingsError::Zero { field });
    }
    Ok(value)
}

impl AvailabilitySettings {
    pub fn regeneration_cron(&self) -> &str {
        self.regeneration_cron
            .as_deref()
            .unwrap_or(DEFAULT_REGENERATION_CRON)
    }

    /// Validate settings into the engine policy.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for unknown zones, malformed or inverted
    /// working hours, zero-valued sizes and slots longer than a day.
    pub fn policy(&self) -> Result<AvailabilityPolicy, SettingsError> {
        let zone = self
            .default_time_zone
            .as_deref()
            .unwrap_or(DEFAULT_TIME_ZONE);
        let default_time_zone: Tz = zone
            .parse()
            .map_err(|_| SettingsError::TimeZone(zone.to_owned()))?;

        let start: TimeOfDay = self
            .default_working_hours_start
            .as_deref()
            .unwrap_or(DEFAULT_WORKING_HOURS_START)
            .parse()?;
        let end: TimeOfDay = self
            .default_working_hours_end
            .as_deref()
            .unwrap_or(DEFAULT_WORKING_HOURS_END)
            .parse()?;
        let default_working_hours =
            WallClockRange::new(start, end).ok_or(SettingsError::InvertedWorkingHours)?;

        let slot_duration_minutes = at_least_one(
            self.slot_duration_minutes,
            DEFAULT_SLOT_DURATION_MINUTES,
            "slot_duration_minutes",
        )?;
        if slot_duration_minutes > MAX_SLOT_DURATION_MINUTES {
            return Err(SettingsError::TooLarge {
                field: "slot_duration_minutes",
                max: u64::from(MAX_SLOT_DURATION_MINUTES),
            });
        }

        let cache_ttl_minutes = at_least_one(
            self.cache_ttl_minutes,
            DEFAULT_CACHE_TTL_MINUTES,
            "cache_ttl_minutes",
        )?;

        Ok(AvailabilityPolicy {
            default_time_zone,
            default_working_hours,
            default_buffer_minutes: self.default_buffer_minutes.unwrap_or(0),
            max_advance_booking: TimeDelta::days(i64::from(
                self.max_advance_booking_days
                    .unwrap_or(DEFAULT_MAX_ADVANCE_BOOKING_DAYS),
            )),
            min_advance_booking: TimeDelta::hours(i64::from(
                self.min_advance_booking_hours.unwrap_or(0),
            )),
            generation_window_days: at_least_one(
                self.slot_generation_window_days,
                DEFAULT_SLOT_GENERATION_WINDOW_DAYS,
                "slot_generation_window_days",
            )?,
            slot_duration_minutes,
            max_slots_per_query: at_least_one(
                self.max_slots_per_query,
                DEFAULT_MAX_SLOTS_PER_QUERY,
                "max_slots_per_query",
            )?,
            cache_enabled: self.cache_enabled,
            cache_ttl: std::time::Duration::from_secs(cache_ttl_minutes.saturating_mul(60)),
            optimization_enabled: self.optimization_enabled,
            allow_overlapping_slots: self.allow_overlapping_slots,
        })
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServerSettings {
    /// Address passed to `HttpServer::bind`.
    pub fn bind_addr(&self) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const AVAILABILITY_VARS: [&str; 14] = [
        "AVAILABILITY_DEFAULT_TIME_ZONE",
        "AVAILABILITY_DEFAULT_WORKING_HOURS_START",
        "AVAILABILITY_DEFAULT_WORKING_HOURS_END",
        "AVAILABILITY_DEFAULT_BUFFER_MINUTES",
        "AVAILABILITY_MAX_ADVANCE_BOOKING_DAYS",
        "AVAILABILITY_MIN_ADVANCE_BOOKING_HOURS",
        "AVAILABILITY_SLOT_GENERATION_WINDOW_DAYS",
        "AVAILABILITY_SLOT_DURATION_MINUTES",
        "AVAILABILITY_MAX_SLOTS_PER_QUERY",
        "AVAILABILITY_CACHE_ENABLED",
        "AVAILABILITY_CACHE_TTL_MINUTES",
        "AVAILABILITY_OPTIMIZATION_ENABLED",
        "AVAILABILITY_ALLOW_OVERLAPPING_SLOTS",
        "AVAILABILITY_REGENERATION_CRON",
    ];

    fn cleared_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        AVAILABILITY_VARS
            .iter()
            .map(|&name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_owned());
                (name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> AvailabilitySettings {
        AvailabilitySettings::load_from_iter([OsString::from("meetings-backend")])
            .expect("config should load")
    }

    fn settings() -> AvailabilitySettings {
        AvailabilitySettings {
            default_time_zone: None,
            default_working_hours_start: None,
            default_working_hours_end: None,
            default_buffer_minutes: None,
            max_advance_booking_days: None,
            min_advance_booking_hours: None,
            slot_generation_window_days: None,
            slot_duration_minutes: None,
            max_slots_per_query: None,
            cache_enabled: true,
            cache_ttl_minutes: None,
            optimization_enabled: true,
            allow_overlapping_slots: false,
            regeneration_cron: None,
        }
    }

    #[rstest]
    fn defaults_match_engine_defaults() {
        let _guard = lock_env(cleared_with(&[]));

        let loaded = load_from_empty_args();

        assert_eq!(
            loaded.policy().expect("defaults are valid"),
            AvailabilityPolicy::default()
        );
        assert_eq!(loaded.regeneration_cron(), "0 0 0 * * *");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("AVAILABILITY_DEFAULT_TIME_ZONE", "Europe/London"),
            ("AVAILABILITY_SLOT_DURATION_MINUTES", "15"),
            ("AVAILABILITY_MIN_ADVANCE_BOOKING_HOURS", "24"),
            ("AVAILABILITY_CACHE_ENABLED", "false"),
        ]));

        let policy = load_from_empty_args().policy().expect("valid overrides");

        assert_eq!(policy.default_time_zone, chrono_tz::Europe::London);
        assert_eq!(policy.slot_duration_minutes, 15);
        assert_eq!(policy.min_advance_booking, TimeDelta::hours(24));
        assert!(!policy.cache_enabled);
    }

    #[rstest]
    #[case::zone(
        AvailabilitySettings { default_time_zone: Some("Nowhere/Land".to_owned()), ..settings() },
        SettingsError::TimeZone("Nowhere/Land".to_owned())
    )]
    #[case::inverted_hours(
        AvailabilitySettings {
            default_working_hours_start: Some("18:00".to_owned()),
            ..settings()
        },
        SettingsError::InvertedWorkingHours
    )]
    #[case::zero_duration(
        AvailabilitySettings { slot_duration_minutes: Some(0), ..settings() },
        SettingsError::Zero { field: "slot_duration_minutes" }
    )]
    #[case::day_long_duration(
        AvailabilitySettings { slot_duration_minutes: Some(1441), ..settings() },
        SettingsError::TooLarge { field: "slot_duration_minutes", max: 1440 }
    )]
    fn invalid_values_are_rejected(
        #[case] input: AvailabilitySettings,
        #[case] expected: SettingsError,
    ) {
        assert_eq!(input.policy(), Err(expected));
    }

    #[rstest]
    fn malformed_working_hours_fail_fast() {
        let input = AvailabilitySettings {
            default_working_hours_end: Some("5pm".to_owned()),
            ..settings()
        };
        assert!(matches!(input.policy(), Err(SettingsError::WorkingHours(_))));
    }

    #[rstest]
    fn server_defaults_bind_all_interfaces() {
        let _guard = lock_env([
            ("SERVER_HOST", None::<String>),
            ("SERVER_PORT", Some("9090".to_owned())),
        ]);

        let server = ServerSettings::load_from_iter([OsString::from("meetings-backend")])
            .expect("config should load");

        assert_eq!(server.bind_addr(), ("0.0.0.0".to_owned(), 9090));
    }
}
