//! Per-student notification triggers derived from academic events.
//!
//! One event yields zero or more triggers: a grade or attendance mark
//! concerns a single student, a homework assignment concerns every student
//! of the class.

use eduhub_core::events::{
    AttendanceMarked, AttendanceStatus, GradeRecorded, HomeworkAssigned, StudentRef,
};
use eduhub_core::types::id::UserId;
use eduhub_entity::notification::{NotificationType, RelatedEntity, RelatedEntityKind};

/// The event data a trigger was derived from.
#[derive(Debug, Clone, Copy)]
pub enum TriggerSource<'a> {
    /// A recorded grade.
    Grade(&'a GradeRecorded),
    /// An attendance mark with status absent or late.
    Attendance(&'a AttendanceMarked),
    /// A homework assignment, for one student of the class.
    Homework {
        /// The assignment.
        event: &'a HomeworkAssigned,
        /// The student this trigger targets.
        student: &'a StudentRef,
    },
}

/// A classified reason to notify one student and possibly their guardians.
#[derive(Debug, Clone, Copy)]
pub struct Trigger<'a> {
    /// Notification type, fixed at classification time.
    pub kind: NotificationType,
    /// Originating event data.
    pub source: TriggerSource<'a>,
}

impl<'a> Trigger<'a> {
    /// Classify a grade: values at or below `bad_grade_max` are bad.
    pub fn grade(event: &'a GradeRecorded, bad_grade_max: i16) -> Self {
        let kind = if event.value <= bad_grade_max {
            NotificationType::BadGrade
        } else {
            NotificationType::GoodGrade
        };
        Self {
            kind,
            source: TriggerSource::Grade(event),
        }
    }

    /// Classify an attendance mark. Returns `None` for statuses that do not
    /// notify anyone.
    pub fn attendance(event: &'a AttendanceMarked) -> Option<Self> {
        if !event.status.triggers_notification() {
            return None;
        }
        let kind = match event.status {
            AttendanceStatus::Late => NotificationType::Late,
            _ => NotificationType::Absence,
        };
        Some(Self {
            kind,
            source: TriggerSource::Attendance(event),
        })
    }

    /// One trigger per student of a homework assignment.
    pub fn homework(event: &'a HomeworkAssigned) -> Vec<Self> {
        event
            .students
            .iter()
            .map(|student| Self {
                kind: NotificationType::HomeworkAssigned,
                source: TriggerSource::Homework { event, student },
            })
            .collect()
    }

    /// The student the trigger concerns.
    pub fn student_id(&self) -> UserId {
        match self.source {
            TriggerSource::Grade(e) => e.student_id,
            TriggerSource::Attendance(e) => e.student_id,
            TriggerSource::Homework { student, .. } => student.id,
        }
    }

    /// The student's display name snapshot, if the event carried one.
    pub fn student_name(&self) -> Option<&'a str> {
        match self.source {
            TriggerSource::Grade(e) => e.student_name.as_deref(),
            TriggerSource::Attendance(e) => e.student_name.as_deref(),
            TriggerSource::Homework { student, .. } => student.name.as_deref(),
        }
    }

    /// The grade value, for grade triggers.
    pub fn grade_value(&self) -> Option<i16> {
        match self.source {
            TriggerSource::Grade(e) => Some(e.value),
            _ => None,
        }
    }

    /// Whether guardians are considered at all. Good grades stay with the
    /// student.
    pub fn reaches_guardians(&self) -> bool {
        matches!(
            self.kind,
            NotificationType::BadGrade
                | NotificationType::Absence
                | NotificationType::Late
                | NotificationType::HomeworkAssigned
        )
    }

    /// Drill-down reference to the originating record.
    pub fn related_entity(&self) -> RelatedEntity {
        match self.source {
            TriggerSource::Grade(e) => RelatedEntity::new(RelatedEntityKind::Grade, e.grade_id),
            TriggerSource::Attendance(e) => {
                RelatedEntity::new(RelatedEntityKind::Attendance, e.attendance_id)
            }
            TriggerSource::Homework { event, .. } => {
                RelatedEntity::new(RelatedEntityKind::Homework, event.homework_id)
            }
        }
    }
}
