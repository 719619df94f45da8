//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the availability engine independently of transport and
//! storage. Adapters reach it through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TraceId: request-scoped correlation identifier.
//! - TimeOfDay: strict `HH:MM` wall-clock value.
//! - AvailabilityService: implementation of the driving ports.

pub mod availability;
mod availability_service;
mod availability_service_support;
pub mod error;
pub mod ports;
pub mod time_of_day;
pub mod trace_id;

pub use self::availability_service::AvailabilityService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::time_of_day::{TimeOfDay, TimeOfDayParseError, WallClockRange};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use meetings_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such profile"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
