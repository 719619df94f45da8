//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::domain::ports::{AvailabilityCommand, AvailabilityQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub availability: Arc<dyn AvailabilityCommand>,
    pub availability_query: Arc<dyn AvailabilityQuery>,
    /// Zone applied to rule payloads that omit `timeZone`.
    pub default_time_zone: Tz,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```ignore
    /// use std::sync::Arc;
    ///
    /// let service = Arc::new(service);
    /// let state = HttpState::new(service.clone(), service, chrono_tz::Tz::UTC);
    /// ```
    pub fn new(
        availability: Arc<dyn AvailabilityCommand>,
        availability_query: Arc<dyn AvailabilityQuery>,
        default_time_zone: Tz,
    ) -> Self {
        Self {
            availability,
            availability_query,
            default_time_zone,
        }
    }
}
