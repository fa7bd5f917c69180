//! Polymorphic reference to the entity a notification originated from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of entity a notification can point back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "related_entity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelatedEntityKind {
    /// A grade record.
    Grade,
    /// An attendance record.
    Attendance,
    /// A homework assignment.
    Homework,
}

impl RelatedEntityKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grade => "grade",
            Self::Attendance => "attendance",
            Self::Homework => "homework",
        }
    }
}

impl std::fmt::Display for RelatedEntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Drill-down reference (kind + id). Never a required link: the source
/// record may have been deleted since the notification was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedEntity {
    /// Entity kind.
    pub kind: RelatedEntityKind,
    /// Entity ID.
    pub id: Uuid,
}

impl RelatedEntity {
    /// Create a new reference.
    pub fn new(kind: RelatedEntityKind, id: impl Into<Uuid>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}
