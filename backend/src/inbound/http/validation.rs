//! Shared validation helpers for inbound HTTP adapters.
//!
//! Parsers turn raw JSON strings into domain values and report failures as
//! `invalid_request` errors whose details name the offending field.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, TimeOfDay};
use crate::domain::availability::{MAX_WEEKDAY, TenantId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidDate,
    InvalidTime,
    InvalidTimeZone,
    InvalidWeekday,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidTimeZone => "invalid_time_zone",
            ErrorCode::InvalidWeekday => "invalid_weekday",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::new(
                field,
                format!("{} must be an ISO-8601 timestamp", field.as_str()),
            )
            .with_value(ErrorCode::InvalidTimestamp, value)
        })
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{} must be a YYYY-MM-DD date", field.as_str()))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<TimeOfDay, Error> {
    value.parse::<TimeOfDay>().map_err(|err| {
        ValidationError::new(field, format!("{}: {err}", field.as_str()))
            .with_value(ErrorCode::InvalidTime, value)
    })
}

pub(crate) fn parse_optional_time(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<TimeOfDay>, Error> {
    value.map(|raw| parse_time(raw, field)).transpose()
}

pub(crate) fn parse_time_zone(value: &str, field: FieldName) -> Result<Tz, Error> {
    value.parse::<Tz>().map_err(|_| {
        ValidationError::new(
            field,
            format!("{} must be an IANA time zone", field.as_str()),
        )
        .with_value(ErrorCode::InvalidTimeZone, value)
    })
}

pub(crate) fn parse_weekday(value: u8, field: FieldName) -> Result<u8, Error> {
    if value > MAX_WEEKDAY {
        return Err(ValidationError::new(
            field,
            format!("{} must be between 0 (Sunday) and 6", field.as_str()),
        )
        .with_value(ErrorCode::InvalidWeekday, value.to_string()));
    }
    Ok(value)
}

/// Parse one of the stable wire names of a domain enum.
pub(crate) fn parse_enum<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| {
        ValidationError::new(field, format!("{}: {err}", field.as_str()))
            .with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_tenant_id(value: &str, field: FieldName) -> Result<TenantId, Error> {
    TenantId::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
    })
}
