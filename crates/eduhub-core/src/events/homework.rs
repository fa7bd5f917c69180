//! Homework events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::StudentRef;
use crate::types::id::{HomeworkId, SubjectId};

/// Homework was assigned to every student of a school class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeworkAssigned {
    /// The homework record ID.
    pub homework_id: HomeworkId,
    /// Students of the class at the time of assignment.
    pub students: Vec<StudentRef>,
    /// The subject the homework belongs to.
    pub subject_id: Option<SubjectId>,
    /// Subject display name snapshot.
    pub subject_name: Option<String>,
    /// Teacher display name snapshot.
    pub teacher_name: Option<String>,
    /// Homework title.
    pub title: String,
    /// Homework description.
    pub description: Option<String>,
    /// Date the homework was assigned.
    pub assigned_date: NaiveDate,
    /// Date the homework is due.
    pub due_date: NaiveDate,
    /// Maximum achievable points.
    pub max_points: Option<i32>,
}
