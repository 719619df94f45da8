//! Cron-driven regeneration of every active profile.
//!
//! The scheduler owns a single job that calls
//! [`AvailabilityCommand::regenerate_all_active`]. Lifecycle is explicit:
//! nothing runs until [`RegenerationScheduler::start`] and every call into
//! the underlying scheduler is bounded by a timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::domain::Error;
use crate::domain::ports::{AvailabilityCommand, RegenerationReport};

/// Scheduler lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,
    #[error("scheduler is not running")]
    NotRunning,
    #[error("failed to create scheduler: {0}")]
    CreationFailed(String),
    #[error("failed to register regeneration job: {0}")]
    JobRegistrationFailed(String),
    #[error("failed to start scheduler: {0}")]
    StartFailed(String),
    #[error("failed to stop scheduler: {0}")]
    StopFailed(String),
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("regeneration failed: {0}")]
    Regeneration(#[from] Error),
}

/// Timing configuration for [`RegenerationScheduler`].
#[derive(Debug, Clone)]
pub struct RegenerationSchedulerConfig {
    /// Six-field cron expression (seconds first), evaluated in UTC.
    pub cron_expression: String,
    pub tick_timeout: Duration,
    pub lifecycle_timeout: Duration,
}

impl Default for RegenerationSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 0 0 * * *".into(),
            tick_timeout: Duration::from_secs(300),
            lifecycle_timeout: Duration::from_secs(5),
        }
    }
}

/// Periodically regenerates slots for all active profiles.
pub struct RegenerationScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    config: RegenerationSchedulerConfig,
    running: bool,
}

impl RegenerationScheduler {
    /// Build the scheduler and register the regeneration job.
    ///
    /// # Errors
    ///
    /// Fails when the cron expression is invalid or the underlying scheduler
    /// cannot be created.
    pub async fn new(
        config: RegenerationSchedulerConfig,
        command: Arc<dyn AvailabilityCommand>,
    ) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;

        let tick_timeout = config.tick_timeout;
        let job = Job::new_async(config.cron_expression.as_str(), move |_id, _lock| {
            let command = Arc::clone(&command);
            Box::pin(async move {
                // Outcome is logged inside the tick.
                let _ = run_regeneration(command.as_ref(), tick_timeout).await;
            })
        })
        .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        info!(cron = %config.cron_expression, "registered regeneration job");
        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            config,
            running: false,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start firing the regeneration job.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] when started twice.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        if self.running {
            return Err(SchedulerError::AlreadyRunning);
        }
        let scheduler = Arc::clone(&self.scheduler);
        self.bounded(async move { scheduler.read().await.start().await })
            .await?
            .map_err(|err| SchedulerError::StartFailed(err.to_string()))?;
        self.running = true;
        info!("regeneration scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] when the scheduler was never started.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        if !self.running {
            return Err(SchedulerError::NotRunning);
        }
        let scheduler = Arc::clone(&self.scheduler);
        self.bounded(async move { scheduler.write().await.shutdown().await })
            .await?
            .map_err(|err| SchedulerError::StopFailed(err.to_string()))?;
        self.running = false;
        info!("regeneration scheduler stopped");
        Ok(())
    }

    async fn bounded<F, T>(&self, future: F) -> Result<T, SchedulerError>
    where
        F: std::future::Future<Output = T>,
    {
        let limit = self.config.lifecycle_timeout;
        tokio::time::timeout(limit, future)
            .await
            .map_err(|_| SchedulerError::Timeout {
                seconds: limit.as_secs(),
            })
    }
}

impl Drop for RegenerationScheduler {
    fn drop(&mut self) {
        if self.running {
            warn!("regeneration scheduler dropped while running");
        }
    }
}

/// Run one regeneration tick with a time limit.
///
/// # Errors
///
/// Returns the command error, or [`SchedulerError::Timeout`] when the tick
/// overruns `limit`.
pub async fn run_regeneration(
    command: &dyn AvailabilityCommand,
    limit: Duration,
) -> Result<RegenerationReport, SchedulerError> {
    let started = Instant::now();
    info!("scheduled regeneration started");
    match tokio::time::timeout(limit, command.regenerate_all_active()).await {
        Ok(Ok(report)) => {
            info!(
                profiles = report.profiles,
                slots = report.slots,
                failed = report.failed.len(),
                duration_ms = started.elapsed().as_millis(),
                "scheduled regeneration finished"
            );
            Ok(report)
        }
        Ok(Err(err)) => {
            error!(error = %err, "scheduled regeneration failed");
            Err(err.into())
        }
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "scheduled regeneration timed out");
            Err(SchedulerError::Timeout {
                seconds: limit.as_secs(),
            })
        }
    }
}
