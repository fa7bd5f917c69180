//! Notification category and priority enumerations.

use serde::{Deserialize, Serialize};

/// Category of a notification for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    /// Grades and academic performance.
    Academic,
    /// Lesson attendance.
    Attendance,
    /// Homework assignment and review.
    Homework,
    /// School administration messages.
    Administrative,
    /// Conduct and discipline.
    Behavioral,
}

impl NotificationCategory {
    /// Return the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Attendance => "attendance",
            Self::Homework => "homework",
            Self::Administrative => "administrative",
            Self::Behavioral => "behavioral",
        }
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Worth reading soon.
    Medium,
    /// Needs attention.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl NotificationPriority {
    /// Return the priority as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
