//! Unpersisted notification produced by the composer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eduhub_core::types::id::UserId;

use super::category::{NotificationCategory, NotificationPriority};
use super::kind::NotificationType;
use super::related::RelatedEntity;

/// Everything needed to insert one notification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// The recipient.
    pub recipient_id: UserId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Priority.
    pub priority: NotificationPriority,
    /// Category.
    pub category: NotificationCategory,
    /// Denormalized snapshot of the source facts.
    pub data: serde_json::Value,
    /// Optional drill-down reference.
    pub related: Option<RelatedEntity>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}
