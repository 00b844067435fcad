//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use warden_core::error::AppError;

use crate::jobs::CleanupJob;

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register the cleanup job on `cron` (six fields, seconds first).
    pub async fn register_cleanup(&self, job: Arc<CleanupJob>, cron: &str) -> Result<(), AppError> {
        let schedule = CronJob::new_async(cron, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::debug!("Running scheduled cleanup");
                if let Err(e) = job.run_once().await {
                    tracing::error!(error = %e, "Scheduled cleanup failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid cleanup schedule '{cron}': {e}"))
        })?;

        self.scheduler
            .add(schedule)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add cleanup schedule: {e}")))?;

        tracing::info!(cron = %cron, "Registered: cleanup");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
