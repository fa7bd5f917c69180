//! Filters for listing a recipient's notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{NotificationCategory, NotificationPriority};
use super::kind::NotificationType;
use super::model::Notification;

/// Optional constraints applied when listing notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// `Some(true)` for read only, `Some(false)` for unread only.
    pub is_read: Option<bool>,
    /// Restrict to one type.
    pub notification_type: Option<NotificationType>,
    /// Restrict to one priority.
    pub priority: Option<NotificationPriority>,
    /// Restrict to one category.
    pub category: Option<NotificationCategory>,
    /// Hide notifications whose expiry has passed.
    #[serde(default)]
    pub exclude_expired: bool,
}

impl NotificationFilter {
    /// Only unread notifications.
    pub fn unread() -> Self {
        Self {
            is_read: Some(false),
            ..Self::default()
        }
    }

    /// Check a notification against every set constraint.
    pub fn matches(&self, notification: &Notification, now: DateTime<Utc>) -> bool {
        if let Some(is_read) = self.is_read {
            if notification.is_read != is_read {
                return false;
            }
        }
        if let Some(kind) = self.notification_type {
            if notification.notification_type != kind {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if notification.priority != priority {
                return false;
            }
        }
        if let Some(category) = self.category {
            if notification.category != category {
                return false;
            }
        }
        if self.exclude_expired && notification.is_expired_at(now) {
            return false;
        }
        true
    }
}
