//! Relationship entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eduhub_core::error::AppError;
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{RelationshipId, UserId};

use super::kind::RelationshipKind;
use super::status::RelationshipStatus;

/// A link between a guardian and a student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Relationship {
    /// Unique relationship identifier.
    pub id: RelationshipId,
    /// The guardian side of the link.
    pub guardian_id: UserId,
    /// The student side of the link.
    pub student_id: UserId,
    /// How the guardian is related to the student.
    pub kind: RelationshipKind,
    /// Whether this guardian is the primary contact.
    pub is_primary: bool,
    /// Current approval state.
    pub status: RelationshipStatus,
    /// When the link was approved.
    pub verified_at: Option<DateTime<Utc>>,
    /// Who requested the link.
    pub created_by: Option<UserId>,
    /// Why the link was rejected.
    pub rejection_reason: Option<String>,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Build a new pending relationship from creation data.
    pub fn pending(data: CreateRelationship) -> Self {
        let now = Utc::now();
        Self {
            id: RelationshipId::new(),
            guardian_id: data.guardian_id,
            student_id: data.student_id,
            kind: data.kind,
            is_primary: data.is_primary,
            status: RelationshipStatus::Pending,
            verified_at: None,
            created_by: data.created_by,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the guardian may currently receive information.
    pub fn is_active(&self) -> bool {
        self.status == RelationshipStatus::Active
    }

    /// Approve a pending link.
    pub fn approve(&mut self, at: DateTime<Utc>) -> AppResult<()> {
        self.transition(RelationshipStatus::Active, at)?;
        self.verified_at = Some(at);
        self.rejection_reason = None;
        Ok(())
    }

    /// Reject a pending link with a reason.
    pub fn reject(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> AppResult<()> {
        self.transition(RelationshipStatus::Rejected, at)?;
        self.rejection_reason = Some(reason.into());
        self.verified_at = None;
        Ok(())
    }

    /// Revoke an active link.
    pub fn revoke(&mut self, at: DateTime<Utc>) -> AppResult<()> {
        self.transition(RelationshipStatus::Revoked, at)
    }

    fn transition(&mut self, next: RelationshipStatus, at: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Relationship {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = at;
        Ok(())
    }
}

/// Data required to create a new relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationship {
    /// The guardian.
    pub guardian_id: UserId,
    /// The student.
    pub student_id: UserId,
    /// Relationship kind.
    pub kind: RelationshipKind,
    /// Whether the guardian is the primary contact.
    #[serde(default)]
    pub is_primary: bool,
    /// Who requested the link.
    pub created_by: Option<UserId>,
}
