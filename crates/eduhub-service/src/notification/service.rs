//! Notification read state for recipients.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use eduhub_core::error::AppError;
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{NotificationId, UserId};
use eduhub_core::types::pagination::{PageRequest, PageResponse};
use eduhub_database::store::NotificationSink;
use eduhub_entity::notification::{Notification, NotificationFilter};

use super::related::RelatedEntityRegistry;

/// Lists notifications and manages their read state.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification storage.
    sink: Arc<dyn NotificationSink>,
    /// Drill-down loaders.
    related: Arc<RelatedEntityRegistry>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("related", &self.related)
            .finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(sink: Arc<dyn NotificationSink>, related: Arc<RelatedEntityRegistry>) -> Self {
        Self { sink, related }
    }

    /// Lists a recipient's notifications, newest first.
    pub async fn list(
        &self,
        recipient_id: UserId,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.sink.list(recipient_id, filter, &page).await
    }

    /// Gets one of the recipient's notifications.
    pub async fn get(&self, recipient_id: UserId, id: NotificationId) -> AppResult<Notification> {
        self.sink
            .find(id, recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    /// Marks a notification as read. Marking it again is a no-op.
    pub async fn mark_read(&self, recipient_id: UserId, id: NotificationId) -> AppResult<()> {
        if !self.sink.mark_read(id, recipient_id, Utc::now()).await? {
            // Either already read or not owned by the recipient.
            self.get(recipient_id, id).await?;
        }
        Ok(())
    }

    /// Marks a notification as unread. Marking it again is a no-op.
    pub async fn mark_unread(&self, recipient_id: UserId, id: NotificationId) -> AppResult<()> {
        if !self.sink.mark_unread(id, recipient_id).await? {
            self.get(recipient_id, id).await?;
        }
        Ok(())
    }

    /// Marks all of a recipient's notifications as read.
    pub async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64> {
        let count = self.sink.mark_all_read(recipient_id, Utc::now()).await?;
        info!(%recipient_id, count, "Marked all notifications read");
        Ok(count)
    }

    /// Gets the number of unread, unexpired notifications.
    pub async fn unread_count(&self, recipient_id: UserId) -> AppResult<u64> {
        self.sink.count_unread(recipient_id, Utc::now()).await
    }

    /// Resolves the entity a notification points back to. `None` when the
    /// notification has no reference or the entity is gone.
    pub async fn related_entity(
        &self,
        recipient_id: UserId,
        id: NotificationId,
    ) -> AppResult<Option<Value>> {
        let notification = self.get(recipient_id, id).await?;
        match notification.related_entity() {
            Some(entity) => self.related.resolve(&entity).await,
            None => Ok(None),
        }
    }
}
