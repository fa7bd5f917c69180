//! Academic domain events consumed by the notification engine.
//!
//! Events are published by the gradebook when a grade, attendance mark, or
//! homework assignment is committed, and delivered to the fan-out worker as
//! typed messages. Payloads carry denormalized display fields (names,
//! dates) so that notifications can be composed without re-querying the
//! source records.

pub mod attendance;
pub mod grade;
pub mod homework;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::{EventId, UserId};

pub use attendance::{AttendanceMarked, AttendanceStatus};
pub use grade::GradeRecorded;
pub use homework::HomeworkAssigned;

/// Wrapper for all academic events with delivery metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: EventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The teacher or administrator who caused the event (if known).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: AcademicEvent,
}

impl DomainEvent {
    /// Create a new domain event stamped with the current time.
    pub fn new(actor_id: Option<UserId>, payload: AcademicEvent) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}

/// Union of all academic event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AcademicEvent {
    /// A grade was recorded for a student.
    GradeRecorded(GradeRecorded),
    /// Attendance was marked for a student.
    AttendanceMarked(AttendanceMarked),
    /// Homework was assigned to a school class.
    HomeworkAssigned(HomeworkAssigned),
}

impl AcademicEvent {
    /// Name of the originating entity kind, used in log context.
    pub fn entity_kind(&self) -> &'static str {
        match self {
            Self::GradeRecorded(_) => "grade",
            Self::AttendanceMarked(_) => "attendance",
            Self::HomeworkAssigned(_) => "homework",
        }
    }

    /// ID of the originating entity, used in log context.
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::GradeRecorded(e) => e.grade_id.into_uuid(),
            Self::AttendanceMarked(e) => e.attendance_id.into_uuid(),
            Self::HomeworkAssigned(e) => e.homework_id.into_uuid(),
        }
    }
}

impl From<GradeRecorded> for AcademicEvent {
    fn from(event: GradeRecorded) -> Self {
        Self::GradeRecorded(event)
    }
}

impl From<AttendanceMarked> for AcademicEvent {
    fn from(event: AttendanceMarked) -> Self {
        Self::AttendanceMarked(event)
    }
}

impl From<HomeworkAssigned> for AcademicEvent {
    fn from(event: HomeworkAssigned) -> Self {
        Self::HomeworkAssigned(event)
    }
}

/// A student reference with an optional display name snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    /// The student's ID.
    pub id: UserId,
    /// The student's full name at the time of the event.
    pub name: Option<String>,
}

impl StudentRef {
    /// Create a student reference.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}
