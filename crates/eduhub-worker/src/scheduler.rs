//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use eduhub_core::config::NotificationConfig;
use eduhub_core::error::AppError;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::jobs::cleanup::NOTIFICATION_CLEANUP;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor the scheduled ticks dispatch to
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(
        &self,
        config: &NotificationConfig,
    ) -> Result<(), AppError> {
        self.register(NOTIFICATION_CLEANUP, &config.cleanup_cron).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run the handler registered for `job_type` on a cron schedule
    pub async fn register(&self, job_type: &str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "Cannot schedule '{}': no handler registered",
                job_type
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                tracing::debug!("Running scheduled job '{}'", name);
                match executor.execute(&name).await {
                    Ok(report) => {
                        tracing::info!("Scheduled job '{}' completed: {:?}", name, report)
                    }
                    Err(JobExecutionError::Transient(msg)) => {
                        tracing::warn!("Scheduled job '{}' failed (transient): {}", name, msg)
                    }
                    Err(e) => tracing::error!("Scheduled job '{}' failed: {}", name, e),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{}' for {}: {}",
                schedule, job_type, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {} schedule: {}", job_type, e))
        })?;

        tracing::info!("Registered: {} ({})", job_type, schedule);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scheduling_unregistered_job_fails() {
        let scheduler = CronScheduler::new(Arc::new(JobExecutor::new()))
            .await
            .unwrap();
        let err = scheduler
            .register(NOTIFICATION_CLEANUP, "0 0 3 * * *")
            .await
            .unwrap_err();
        assert_eq!(err.kind, eduhub_core::error::ErrorKind::Configuration);
    }
}
