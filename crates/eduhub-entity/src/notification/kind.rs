//! Notification type enumeration.

use serde::{Deserialize, Serialize};

use super::category::{NotificationCategory, NotificationPriority};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A grade at or below the unsatisfactory threshold.
    BadGrade,
    /// A grade above the unsatisfactory threshold.
    GoodGrade,
    /// Unexcused absence from a lesson.
    Absence,
    /// Late arrival to a lesson.
    Late,
    /// New homework was assigned.
    HomeworkAssigned,
    /// A homework deadline is approaching.
    HomeworkDeadline,
    /// A homework deadline has passed.
    HomeworkOverdue,
    /// Submitted homework was reviewed.
    HomeworkReviewed,
    /// School announcement.
    Announcement,
    /// A report is ready for download.
    ReportReady,
    /// Anything else.
    Other,
}

impl NotificationType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadGrade => "bad_grade",
            Self::GoodGrade => "good_grade",
            Self::Absence => "absence",
            Self::Late => "late",
            Self::HomeworkAssigned => "homework_assigned",
            Self::HomeworkDeadline => "homework_deadline",
            Self::HomeworkOverdue => "homework_overdue",
            Self::HomeworkReviewed => "homework_reviewed",
            Self::Announcement => "announcement",
            Self::ReportReady => "report_ready",
            Self::Other => "other",
        }
    }

    /// Default priority for notifications of this type.
    pub fn default_priority(&self) -> NotificationPriority {
        match self {
            Self::BadGrade | Self::Absence | Self::HomeworkDeadline | Self::HomeworkOverdue => {
                NotificationPriority::High
            }
            Self::GoodGrade | Self::Late | Self::HomeworkAssigned | Self::HomeworkReviewed => {
                NotificationPriority::Medium
            }
            Self::Announcement | Self::ReportReady | Self::Other => NotificationPriority::Low,
        }
    }

    /// Category notifications of this type are filed under.
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::BadGrade | Self::GoodGrade => NotificationCategory::Academic,
            Self::Absence | Self::Late => NotificationCategory::Attendance,
            Self::HomeworkAssigned
            | Self::HomeworkDeadline
            | Self::HomeworkOverdue
            | Self::HomeworkReviewed => NotificationCategory::Homework,
            Self::Announcement | Self::ReportReady | Self::Other => {
                NotificationCategory::Administrative
            }
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
