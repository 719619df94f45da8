//! Meeting availability engine.
//!
//! Users describe when they can meet through availability profiles; the
//! engine expands those rules into bookable slots, answers availability
//! queries across users and tracks slot capacity as bookings arrive.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
