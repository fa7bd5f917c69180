//! PostgreSQL-backed fan-out unit of work.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use eduhub_core::error::{AppError, ErrorKind};
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{NotificationId, UserId};
use eduhub_entity::notification::{NotificationDraft, NotificationPreference};

use crate::repositories::{NotificationRepository, PreferenceRepository, RelationshipRepository};
use crate::store::{FanoutStore, FanoutUnit};

/// Opens one database transaction per fan-out.
#[derive(Debug, Clone)]
pub struct PgFanoutStore {
    pool: PgPool,
}

impl PgFanoutStore {
    /// Create a new fan-out store on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FanoutStore for PgFanoutStore {
    async fn begin(&self) -> AppResult<Box<dyn FanoutUnit>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgFanoutUnit { tx }))
    }
}

/// A fan-out unit running inside a single PostgreSQL transaction.
///
/// sqlx rolls the transaction back when it is dropped without a commit.
#[derive(Debug)]
pub struct PgFanoutUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FanoutUnit for PgFanoutUnit {
    async fn active_guardians_of(&mut self, student_id: UserId) -> AppResult<Vec<UserId>> {
        RelationshipRepository::active_guardians_in(&mut *self.tx, student_id).await
    }

    async fn preference(
        &mut self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        PreferenceRepository::get_or_create_in(&mut *self.tx, guardian_id, student_id).await
    }

    async fn persist(&mut self, draft: NotificationDraft) -> AppResult<NotificationId> {
        NotificationRepository::insert_in(&mut *self.tx, draft).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit fan-out", e)
        })?;
        debug!("Fan-out transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to roll back fan-out", e)
        })
    }
}
