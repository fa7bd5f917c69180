//! Attendance events.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::types::id::{AttendanceId, SubjectId, UserId};

/// Attendance status recorded for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// The student attended the lesson.
    Present,
    /// The student did not attend.
    Absent,
    /// The student arrived after the lesson started.
    Late,
    /// The student was absent due to illness.
    Sick,
    /// The absence was excused in advance.
    Excused,
}

impl AttendanceStatus {
    /// Whether this status triggers notification fan-out.
    ///
    /// Only unexplained absences and lateness are reported; sick and
    /// excused absences were already communicated by the family.
    pub fn triggers_notification(&self) -> bool {
        matches!(self, Self::Absent | Self::Late)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Sick => "sick",
            Self::Excused => "excused",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            "sick" => Ok(Self::Sick),
            "excused" => Ok(Self::Excused),
            _ => Err(AppError::validation(format!(
                "Invalid attendance status: '{s}'. Expected one of: present, absent, late, sick, excused"
            ))),
        }
    }
}

/// Attendance was marked for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMarked {
    /// The attendance record ID.
    pub attendance_id: AttendanceId,
    /// The student the mark applies to.
    pub student_id: UserId,
    /// Student display name snapshot.
    pub student_name: Option<String>,
    /// The subject of the lesson.
    pub subject_id: Option<SubjectId>,
    /// Subject display name snapshot.
    pub subject_name: Option<String>,
    /// Teacher display name snapshot.
    pub teacher_name: Option<String>,
    /// Date of the lesson.
    pub date: NaiveDate,
    /// Recorded status.
    pub status: AttendanceStatus,
    /// Optional reason supplied by the teacher.
    pub reason: Option<String>,
    /// Arrival time for late marks.
    pub arrival_time: Option<NaiveTime>,
    /// Lesson number within the school day.
    pub lesson_number: i16,
}
