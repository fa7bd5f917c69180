//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use eduhub_core::types::id::{NotificationId, UserId};

use super::category::{NotificationCategory, NotificationPriority};
use super::draft::NotificationDraft;
use super::kind::NotificationType;
use super::related::{RelatedEntity, RelatedEntityKind};

/// A notification delivered to a student or guardian.
///
/// Title, message and data describe the fact at the moment it occurred
/// and are never updated; only the read state changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub recipient_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Category.
    pub category: NotificationCategory,
    /// Denormalized snapshot (JSON).
    pub data: serde_json::Value,
    /// Whether the recipient has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Kind of the originating entity (if any).
    pub related_kind: Option<RelatedEntityKind>,
    /// ID of the originating entity (if any).
    pub related_id: Option<Uuid>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialize a draft into a new unread notification.
    pub fn from_draft(draft: NotificationDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id: draft.recipient_id,
            title: draft.title,
            message: draft.message,
            notification_type: draft.notification_type,
            priority: draft.priority,
            category: draft.category,
            data: draft.data,
            is_read: false,
            read_at: None,
            expires_at: draft.expires_at,
            related_kind: draft.related.map(|r| r.kind),
            related_id: draft.related.map(|r| r.id),
            created_at,
        }
    }

    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Check if the notification has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// The originating entity, when both halves of the reference are set.
    pub fn related_entity(&self) -> Option<RelatedEntity> {
        match (self.related_kind, self.related_id) {
            (Some(kind), Some(id)) => Some(RelatedEntity { kind, id }),
            _ => None,
        }
    }

    /// Mark as read. Returns `false` if it was already read.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(at);
        true
    }

    /// Mark as unread. Returns `false` if it was already unread.
    pub fn mark_unread(&mut self) -> bool {
        if !self.is_read {
            return false;
        }
        self.is_read = false;
        self.read_at = None;
        true
    }
}
