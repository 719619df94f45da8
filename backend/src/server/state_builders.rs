//! Builders wiring the availability service to its outbound adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tokio::task::JoinHandle;

use meetings_backend::domain::AvailabilityService;
use meetings_backend::domain::ports::AvailabilityCommand;
use meetings_backend::inbound::http::state::HttpState;
use meetings_backend::outbound::cache::MokaAvailabilityCache;
use meetings_backend::outbound::events::{BroadcastEventBus, spawn_logging_subscriber};
use meetings_backend::outbound::memory::{InMemoryProfileStore, InMemorySlotStore};

use super::ServerConfig;

type Service = AvailabilityService<InMemoryProfileStore, InMemorySlotStore>;

/// Handles produced while wiring the service.
pub struct AvailabilityWiring {
    pub http_state: web::Data<HttpState>,
    /// Command port handed to the regeneration scheduler.
    pub command: Arc<dyn AvailabilityCommand>,
    /// Logging subscriber attached to the event bus.
    pub event_logger: JoinHandle<()>,
}

fn build_service(config: &ServerConfig, events: Arc<BroadcastEventBus>) -> Service {
    let service = AvailabilityService::new(
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(InMemorySlotStore::new()),
        Arc::new(DefaultClock),
        config.policy.clone(),
    )
    .with_events(events);

    if config.policy.cache_enabled {
        service.with_cache(Arc::new(MokaAvailabilityCache::new(config.policy.cache_ttl)))
    } else {
        service
    }
}

/// Build the service over in-memory stores, the moka cache and the broadcast
/// event bus.
///
/// Must run inside a Tokio runtime because the logging subscriber is spawned
/// immediately.
pub fn build_availability(config: &ServerConfig) -> AvailabilityWiring {
    let events = Arc::new(BroadcastEventBus::default());
    let event_logger = spawn_logging_subscriber(&events);
    let service = Arc::new(build_service(config, events));

    AvailabilityWiring {
        http_state: web::Data::new(HttpState::new(
            service.clone(),
            service.clone(),
            config.default_time_zone(),
        )),
        command: service,
        event_logger,
    }
}
