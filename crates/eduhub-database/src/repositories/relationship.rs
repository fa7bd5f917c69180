//! Guardian-student relationship repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use eduhub_core::error::{AppError, ErrorKind};
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{RelationshipId, UserId};
use eduhub_entity::relationship::{Relationship, RelationshipStatus};

use crate::store::{RelationshipDirectory, RelationshipStore};

/// Repository for `guardian_relationships`.
#[derive(Debug, Clone)]
pub struct RelationshipRepository {
    pool: PgPool,
}

impl RelationshipRepository {
    /// Create a new relationship repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active guardians of a student, read through an existing connection
    /// or transaction.
    pub async fn active_guardians_in(
        conn: &mut PgConnection,
        student_id: UserId,
    ) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT guardian_id FROM guardian_relationships WHERE student_id = $1 AND status = $2",
        )
        .bind(student_id)
        .bind(RelationshipStatus::Active)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load guardians", e))
    }
}

#[async_trait]
impl RelationshipDirectory for RelationshipRepository {
    async fn active_guardians_of(&self, student_id: UserId) -> AppResult<Vec<UserId>> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::active_guardians_in(&mut conn, student_id).await
    }
}

#[async_trait]
impl RelationshipStore for RelationshipRepository {
    async fn create(&self, relationship: &Relationship) -> AppResult<Relationship> {
        sqlx::query_as::<_, Relationship>(
            "INSERT INTO guardian_relationships (id, guardian_id, student_id, kind, is_primary, status, \
             verified_at, created_by, rejection_reason, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(relationship.id)
        .bind(relationship.guardian_id)
        .bind(relationship.student_id)
        .bind(relationship.kind)
        .bind(relationship.is_primary)
        .bind(relationship.status)
        .bind(relationship.verified_at)
        .bind(relationship.created_by)
        .bind(&relationship.rejection_reason)
        .bind(relationship.created_at)
        .bind(relationship.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::conflict(
                format!(
                    "Guardian {} is already linked to student {}",
                    relationship.guardian_id, relationship.student_id
                ),
            ),
            other => AppError::with_source(
                ErrorKind::Database,
                "Failed to create relationship",
                other,
            ),
        })
    }

    async fn find_by_id(&self, id: RelationshipId) -> AppResult<Option<Relationship>> {
        sqlx::query_as::<_, Relationship>("SELECT * FROM guardian_relationships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find relationship", e)
            })
    }

    async fn save_status(
        &self,
        relationship: &Relationship,
        expected: RelationshipStatus,
    ) -> AppResult<Relationship> {
        let updated = sqlx::query_as::<_, Relationship>(
            "UPDATE guardian_relationships SET status = $2, verified_at = $3, rejection_reason = $4, \
             updated_at = $5 WHERE id = $1 AND status = $6 RETURNING *",
        )
        .bind(relationship.id)
        .bind(relationship.status)
        .bind(relationship.verified_at)
        .bind(&relationship.rejection_reason)
        .bind(relationship.updated_at)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update relationship", e)
        })?;

        match updated {
            Some(saved) => Ok(saved),
            None => match self.find_by_id(relationship.id).await? {
                Some(current) => Err(AppError::conflict(format!(
                    "Relationship {} is {}, expected {}",
                    relationship.id, current.status, expected
                ))),
                None => Err(AppError::not_found(format!(
                    "Relationship {} not found",
                    relationship.id
                ))),
            },
        }
    }

    async fn find_for_student(&self, student_id: UserId) -> AppResult<Vec<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            "SELECT * FROM guardian_relationships WHERE student_id = $1 \
             ORDER BY is_primary DESC, created_at ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list relationships", e))
    }

    async fn find_for_guardian(&self, guardian_id: UserId) -> AppResult<Vec<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            "SELECT * FROM guardian_relationships WHERE guardian_id = $1 ORDER BY created_at ASC",
        )
        .bind(guardian_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list relationships", e))
    }
}
