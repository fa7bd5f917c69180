//! Grade events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::id::{GradeId, SubjectId, UserId};

/// A grade was recorded for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecorded {
    /// The grade record ID.
    pub grade_id: GradeId,
    /// The graded student.
    pub student_id: UserId,
    /// Student display name snapshot.
    pub student_name: Option<String>,
    /// The subject the grade belongs to.
    pub subject_id: Option<SubjectId>,
    /// Subject display name snapshot.
    pub subject_name: Option<String>,
    /// Teacher display name snapshot.
    pub teacher_name: Option<String>,
    /// Grade value on the 1–5 scale.
    pub value: i16,
    /// Kind of grade (e.g. `"current"`, `"test"`, `"quarter"`).
    pub grade_type: Option<String>,
    /// The date the grade was given for.
    pub date: NaiveDate,
    /// Optional teacher comment.
    pub comment: Option<String>,
}
