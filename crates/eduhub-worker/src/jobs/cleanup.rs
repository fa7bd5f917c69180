//! Expired and old notification cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing;

use eduhub_database::store::NotificationSink;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type name used for registration and scheduling.
pub const NOTIFICATION_CLEANUP: &str = "notification_cleanup";

/// Deletes expired notifications and read notifications past retention
pub struct NotificationCleanupJob {
    /// Notification storage
    sink: Arc<dyn NotificationSink>,
    /// Read notifications older than this many days are removed
    retention_days: i64,
}

impl std::fmt::Debug for NotificationCleanupJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCleanupJob")
            .field("retention_days", &self.retention_days)
            .finish()
    }
}

impl NotificationCleanupJob {
    /// Create a new cleanup job
    pub fn new(sink: Arc<dyn NotificationSink>, retention_days: i64) -> Self {
        Self {
            sink,
            retention_days,
        }
    }
}

#[async_trait]
impl JobHandler for NotificationCleanupJob {
    fn job_type(&self) -> &str {
        NOTIFICATION_CLEANUP
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!(
            "Running notification cleanup (read and older than {} days)",
            self.retention_days
        );

        let now = Utc::now();
        let cutoff = now - Duration::days(self.retention_days);
        let removed = self.sink.purge(cutoff, now).await.map_err(|e| {
            JobExecutionError::Transient(format!("Notification cleanup failed: {}", e))
        })?;

        tracing::info!("Notification cleanup: removed {} notifications", removed);

        Ok(Some(serde_json::json!({
            "task": NOTIFICATION_CLEANUP,
            "removed": removed,
            "retention_days": self.retention_days,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduhub_core::types::id::UserId;
    use eduhub_database::MemoryStore;
    use eduhub_entity::notification::{
        NotificationCategory, NotificationDraft, NotificationPriority, NotificationType,
    };

    fn draft(recipient_id: UserId, expires_in: Duration) -> NotificationDraft {
        NotificationDraft {
            recipient_id,
            title: "Новое домашнее задание".into(),
            message: "m".into(),
            notification_type: NotificationType::HomeworkAssigned,
            priority: NotificationPriority::Medium,
            category: NotificationCategory::Homework,
            data: serde_json::json!({}),
            related: None,
            expires_at: Some(Utc::now() + expires_in),
        }
    }

    #[tokio::test]
    async fn test_removes_only_expired_unread() {
        let store = MemoryStore::new();
        let recipient = UserId::new();
        store
            .persist(draft(recipient, Duration::seconds(-5)))
            .await
            .unwrap();
        store
            .persist(draft(recipient, Duration::days(3)))
            .await
            .unwrap();

        let job = NotificationCleanupJob::new(Arc::new(store.clone()), 180);
        let report = job.execute().await.unwrap().unwrap();

        assert_eq!(report["removed"], 1);
        assert_eq!(store.notifications_for(recipient).await.len(), 1);
    }
}
