//! Guardian notification preference entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use eduhub_core::types::id::UserId;

/// Default inclusive upper bound for a "bad" grade.
pub const DEFAULT_BAD_GRADE_THRESHOLD: i16 = 3;
/// Default number of days before a deadline to remind about homework.
pub const DEFAULT_HOMEWORK_DEADLINE_DAYS: i16 = 1;

/// What one guardian wants to hear about one student.
///
/// Unique per (guardian, student). Materialized with [`Self::defaults`]
/// the first time it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    /// The guardian these preferences belong to.
    pub guardian_id: UserId,
    /// The student they apply to.
    pub student_id: UserId,
    /// Notify about unsatisfactory grades.
    pub notify_bad_grades: bool,
    /// Notify about absences.
    pub notify_absences: bool,
    /// Notify about late arrivals.
    pub notify_late: bool,
    /// Notify about new homework.
    pub notify_homework_assigned: bool,
    /// Notify about approaching homework deadlines.
    pub notify_homework_deadline: bool,
    /// A grade at or below this value counts as bad.
    pub bad_grade_threshold: i16,
    /// Days before the deadline to send a reminder.
    pub homework_deadline_days: i16,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Default preferences for a guardian-student pair.
    pub fn defaults(guardian_id: UserId, student_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            guardian_id,
            student_id,
            notify_bad_grades: true,
            notify_absences: true,
            notify_late: true,
            notify_homework_assigned: true,
            notify_homework_deadline: false,
            bad_grade_threshold: DEFAULT_BAD_GRADE_THRESHOLD,
            homework_deadline_days: DEFAULT_HOMEWORK_DEADLINE_DAYS,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the set fields of an update.
    pub fn apply(&mut self, update: &PreferenceUpdate, at: DateTime<Utc>) {
        if let Some(v) = update.notify_bad_grades {
            self.notify_bad_grades = v;
        }
        if let Some(v) = update.notify_absences {
            self.notify_absences = v;
        }
        if let Some(v) = update.notify_late {
            self.notify_late = v;
        }
        if let Some(v) = update.notify_homework_assigned {
            self.notify_homework_assigned = v;
        }
        if let Some(v) = update.notify_homework_deadline {
            self.notify_homework_deadline = v;
        }
        if let Some(v) = update.bad_grade_threshold {
            self.bad_grade_threshold = v;
        }
        if let Some(v) = update.homework_deadline_days {
            self.homework_deadline_days = v;
        }
        self.updated_at = at;
    }
}

/// Partial update submitted by a guardian.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PreferenceUpdate {
    /// New value for `notify_bad_grades`.
    pub notify_bad_grades: Option<bool>,
    /// New value for `notify_absences`.
    pub notify_absences: Option<bool>,
    /// New value for `notify_late`.
    pub notify_late: Option<bool>,
    /// New value for `notify_homework_assigned`.
    pub notify_homework_assigned: Option<bool>,
    /// New value for `notify_homework_deadline`.
    pub notify_homework_deadline: Option<bool>,
    /// New threshold on the 1–5 grade scale.
    #[validate(range(min = 1, max = 5))]
    pub bad_grade_threshold: Option<i16>,
    /// New reminder lead time in days.
    #[validate(range(min = 1, max = 30))]
    pub homework_deadline_days: Option<i16>,
}

impl PreferenceUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.notify_bad_grades.is_none()
            && self.notify_absences.is_none()
            && self.notify_late.is_none()
            && self.notify_homework_assigned.is_none()
            && self.notify_homework_deadline.is_none()
            && self.bad_grade_threshold.is_none()
            && self.homework_deadline_days.is_none()
    }
}
