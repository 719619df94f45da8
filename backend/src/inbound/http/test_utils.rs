//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::AvailabilityService;
use crate::domain::availability::AvailabilityPolicy;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryProfileStore, InMemorySlotStore};
use crate::test_support::availability::fixture_clock;

/// Handler state backed by a real service over in-memory stores.
///
/// The clock is pinned to `now`. The slot store is returned for assertions.
pub fn in_memory_state(now: &str) -> (HttpState, Arc<InMemorySlotStore>) {
    let slots = Arc::new(InMemorySlotStore::default());
    let service = Arc::new(AvailabilityService::new(
        Arc::new(InMemoryProfileStore::default()),
        Arc::clone(&slots),
        fixture_clock(now),
        AvailabilityPolicy::default(),
    ));
    let state = HttpState::new(service.clone(), service, chrono_tz::UTC);
    (state, slots)
}

/// App with every availability route mounted under `/api/v1`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(crate::inbound::http::configure))
}
