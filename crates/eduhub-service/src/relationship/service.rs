//! Guardian-student link lifecycle.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use eduhub_core::error::AppError;
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{RelationshipId, UserId};
use eduhub_database::store::RelationshipStore;
use eduhub_entity::relationship::{CreateRelationship, Relationship};

/// Links guardians to students and moves links through their approval
/// states.
#[derive(Clone)]
pub struct RelationshipService {
    /// Relationship storage.
    store: Arc<dyn RelationshipStore>,
}

impl std::fmt::Debug for RelationshipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipService").finish()
    }
}

impl RelationshipService {
    /// Creates a new relationship service.
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    /// Requests a new link. It stays `pending` until approved.
    pub async fn link(&self, data: CreateRelationship) -> AppResult<Relationship> {
        if data.guardian_id == data.student_id {
            return Err(AppError::validation("A user cannot be their own guardian"));
        }
        let created = self.store.create(&Relationship::pending(data)).await?;
        info!(
            relationship_id = %created.id,
            guardian_id = %created.guardian_id,
            student_id = %created.student_id,
            kind = %created.kind,
            "Guardian link requested"
        );
        Ok(created)
    }

    /// Approves a pending link.
    pub async fn approve(&self, id: RelationshipId) -> AppResult<Relationship> {
        let mut relationship = self.load(id).await?;
        let prior = relationship.status;
        relationship.approve(Utc::now())?;
        let saved = self.store.save_status(&relationship, prior).await?;
        info!(relationship_id = %id, "Guardian link approved");
        Ok(saved)
    }

    /// Rejects a pending link.
    pub async fn reject(&self, id: RelationshipId, reason: &str) -> AppResult<Relationship> {
        let mut relationship = self.load(id).await?;
        let prior = relationship.status;
        relationship.reject(reason, Utc::now())?;
        let saved = self.store.save_status(&relationship, prior).await?;
        info!(relationship_id = %id, reason, "Guardian link rejected");
        Ok(saved)
    }

    /// Revokes an active link.
    pub async fn revoke(&self, id: RelationshipId) -> AppResult<Relationship> {
        let mut relationship = self.load(id).await?;
        let prior = relationship.status;
        relationship.revoke(Utc::now())?;
        let saved = self.store.save_status(&relationship, prior).await?;
        info!(relationship_id = %id, "Guardian link revoked");
        Ok(saved)
    }

    /// Lists a student's links in any status, primary first.
    pub async fn list_for_student(&self, student_id: UserId) -> AppResult<Vec<Relationship>> {
        self.store.find_for_student(student_id).await
    }

    /// Lists a guardian's links in any status.
    pub async fn list_for_guardian(&self, guardian_id: UserId) -> AppResult<Vec<Relationship>> {
        self.store.find_for_guardian(guardian_id).await
    }

    async fn load(&self, id: RelationshipId) -> AppResult<Relationship> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Relationship {id} not found")))
    }
}
