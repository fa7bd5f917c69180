//! Relationship status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Approval state of a guardian-student link.
///
/// ```text
/// pending ──approve──▶ active ──revoke──▶ revoked
///    │
///    └────reject────▶ rejected
/// ```
///
/// `rejected` and `revoked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    /// Awaiting verification by school staff.
    Pending,
    /// Verified; the guardian receives notifications.
    Active,
    /// Verification was refused.
    Rejected,
    /// A previously active link was withdrawn.
    Revoked,
}

impl RelationshipStatus {
    /// Check whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: RelationshipStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Pending, Self::Rejected)
                | (Self::Active, Self::Revoked)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = eduhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            "revoked" => Ok(Self::Revoked),
            _ => Err(eduhub_core::AppError::validation(format!(
                "Invalid relationship status: '{s}'. Expected one of: pending, active, rejected, revoked"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use RelationshipStatus::*;
        assert!(Pending.can_transition_to(Active));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Active.can_transition_to(Revoked));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        use RelationshipStatus::*;
        for next in [Pending, Active, Rejected, Revoked] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Revoked.can_transition_to(next));
        }
        assert!(!Active.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Revoked));
    }
}
