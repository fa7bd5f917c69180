//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use eduhub_core::error::{AppError, ErrorKind};
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{NotificationId, UserId};
use eduhub_core::types::pagination::{PageRequest, PageResponse};
use eduhub_entity::notification::{Notification, NotificationDraft, NotificationFilter};

use crate::store::NotificationSink;

/// Repository for notification persistence and read state.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification through an existing connection or transaction.
    pub async fn insert_in(
        conn: &mut PgConnection,
        draft: NotificationDraft,
    ) -> AppResult<NotificationId> {
        let related_kind = draft.related.map(|r| r.kind);
        let related_id = draft.related.map(|r| r.id);
        sqlx::query_scalar::<_, NotificationId>(
            "INSERT INTO notifications (id, recipient_id, title, message, notification_type, priority, \
             category, data, expires_at, related_kind, related_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
        )
        .bind(NotificationId::new())
        .bind(draft.recipient_id)
        .bind(&draft.title)
        .bind(&draft.message)
        .bind(draft.notification_type)
        .bind(draft.priority)
        .bind(draft.category)
        .bind(&draft.data)
        .bind(draft.expires_at)
        .bind(related_kind)
        .bind(related_id)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to create notification for {}", draft.recipient_id),
                e,
            )
        })
    }

    fn push_filter(
        builder: &mut QueryBuilder<'_, Postgres>,
        recipient_id: UserId,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) {
        builder.push(" WHERE recipient_id = ").push_bind(recipient_id);
        if let Some(is_read) = filter.is_read {
            builder.push(" AND is_read = ").push_bind(is_read);
        }
        if let Some(kind) = filter.notification_type {
            builder.push(" AND notification_type = ").push_bind(kind);
        }
        if let Some(priority) = filter.priority {
            builder.push(" AND priority = ").push_bind(priority);
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if filter.exclude_expired {
            builder
                .push(" AND (expires_at IS NULL OR expires_at > ")
                .push_bind(now)
                .push(")");
        }
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    async fn persist(&self, draft: NotificationDraft) -> AppResult<NotificationId> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::insert_in(&mut conn, draft).await
    }

    async fn find(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    async fn list(
        &self,
        recipient_id: UserId,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let now = Utc::now();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications");
        Self::push_filter(&mut count, recipient_id, filter, now);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM notifications");
        Self::push_filter(&mut select, recipient_id, filter, now);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let items = select
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
            })?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $3 \
             WHERE id = $1 AND recipient_id = $2 AND is_read = FALSE",
        )
        .bind(id)
        .bind(recipient_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_unread(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = FALSE, read_at = NULL \
             WHERE id = $1 AND recipient_id = $2 AND is_read = TRUE",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark unread", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient_id: UserId, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&self, recipient_id: UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE \
             AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(recipient_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count as u64)
    }

    async fn purge(&self, read_before: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE (expires_at IS NOT NULL AND expires_at <= $2) \
             OR (is_read = TRUE AND created_at < $1)",
        )
        .bind(read_before)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge notifications", e)
        })?;
        Ok(result.rows_affected())
    }
}
