//! Backend entry-point: loads settings, wires the availability service, the
//! regeneration scheduler and the REST endpoints.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use meetings_backend::config::{AvailabilitySettings, ServerSettings};
use meetings_backend::inbound::http::health::HealthState;
use meetings_backend::outbound::scheduling::RegenerationScheduler;
use server::{AvailabilityWiring, ServerConfig, build_availability, create_server};

fn load_config() -> std::io::Result<ServerConfig> {
    let availability = AvailabilitySettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load availability settings: {e}")))?;
    let server = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load server settings: {e}")))?;
    let policy = availability
        .policy()
        .map_err(|e| std::io::Error::other(format!("invalid availability settings: {e}")))?;

    Ok(ServerConfig::new(server.bind_addr(), policy)
        .with_regeneration_cron(availability.regeneration_cron()))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = load_config()?;
    let AvailabilityWiring {
        http_state,
        command,
        event_logger,
    } = build_availability(&config);

    let mut scheduler = RegenerationScheduler::new(config.scheduler.clone(), command)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build scheduler: {e}")))?;
    scheduler
        .start()
        .await
        .map_err(|e| std::io::Error::other(format!("failed to start scheduler: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    info!(host = %config.bind_addr.0, port = config.bind_addr.1, "starting HTTP server");
    let outcome = create_server(health_state, http_state, &config)?.await;

    if let Err(e) = scheduler.stop().await {
        error!(error = %e, "failed to stop regeneration scheduler");
    }
    event_logger.abort();
    outcome
}
