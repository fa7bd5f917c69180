//! Guardian eligibility rules.

use eduhub_entity::notification::{NotificationPreference, NotificationType};

use super::trigger::Trigger;

/// Event facts the eligibility rules depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityInput {
    /// Grade value, for grade notifications.
    pub grade_value: Option<i16>,
}

impl EligibilityInput {
    /// Input for a grade notification.
    pub fn grade(value: i16) -> Self {
        Self {
            grade_value: Some(value),
        }
    }
}

impl From<&Trigger<'_>> for EligibilityInput {
    fn from(trigger: &Trigger<'_>) -> Self {
        Self {
            grade_value: trigger.grade_value(),
        }
    }
}

/// Whether a guardian with `preference` should receive a notification of
/// `kind`. Types without a rule evaluate to `false`.
pub fn should_notify_guardian(
    kind: NotificationType,
    input: &EligibilityInput,
    preference: &NotificationPreference,
) -> bool {
    match kind {
        NotificationType::BadGrade => {
            preference.notify_bad_grades
                && input
                    .grade_value
                    .is_some_and(|value| value <= preference.bad_grade_threshold)
        }
        NotificationType::Absence => preference.notify_absences,
        NotificationType::Late => preference.notify_late,
        NotificationType::HomeworkAssigned => preference.notify_homework_assigned,
        NotificationType::HomeworkDeadline => preference.notify_homework_deadline,
        NotificationType::GoodGrade
        | NotificationType::HomeworkOverdue
        | NotificationType::HomeworkReviewed
        | NotificationType::Announcement
        | NotificationType::ReportReady
        | NotificationType::Other => false,
    }
}
