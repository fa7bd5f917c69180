//! Relationship kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a guardian is related to a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Mother.
    Mother,
    /// Father.
    Father,
    /// Legal guardian.
    Guardian,
    /// Any other authorized adult.
    Other,
}

impl RelationshipKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mother => "mother",
            Self::Father => "father",
            Self::Guardian => "guardian",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = eduhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mother" => Ok(Self::Mother),
            "father" => Ok(Self::Father),
            "guardian" => Ok(Self::Guardian),
            "other" => Ok(Self::Other),
            _ => Err(eduhub_core::AppError::validation(format!(
                "Invalid relationship kind: '{s}'. Expected one of: mother, father, guardian, other"
            ))),
        }
    }
}
