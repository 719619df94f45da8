//! HTTP server configuration object and helpers.

use chrono_tz::Tz;
use meetings_backend::domain::availability::AvailabilityPolicy;
use meetings_backend::outbound::scheduling::RegenerationSchedulerConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) policy: AvailabilityPolicy,
    pub(crate) scheduler: RegenerationSchedulerConfig,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    #[must_use]
    pub fn new(bind_addr: (String, u16), policy: AvailabilityPolicy) -> Self {
        Self {
            bind_addr,
            policy,
            scheduler: RegenerationSchedulerConfig::default(),
        }
    }

    /// Override the cron expression driving background regeneration.
    #[must_use]
    pub fn with_regeneration_cron(mut self, cron_expression: impl Into<String>) -> Self {
        self.scheduler.cron_expression = cron_expression.into();
        self
    }

    /// Zone applied to rule bodies submitted without one.
    #[must_use]
    pub fn default_time_zone(&self) -> Tz {
        self.policy.default_time_zone
    }
}
