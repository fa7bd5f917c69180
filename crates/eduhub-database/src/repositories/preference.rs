//! Guardian notification preference repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use eduhub_core::error::{AppError, ErrorKind};
use eduhub_core::result::AppResult;
use eduhub_core::types::id::UserId;
use eduhub_entity::notification::{NotificationPreference, PreferenceUpdate};

use crate::store::PreferenceStore;

/// Repository for `guardian_notification_preferences`.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomic get-or-create keyed on the (guardian, student) unique index.
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row when
    /// another worker inserted it first, so concurrent callers never race
    /// into a second insert.
    pub async fn get_or_create_in(
        conn: &mut PgConnection,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        let defaults = NotificationPreference::defaults(guardian_id, student_id);
        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO guardian_notification_preferences (guardian_id, student_id, notify_bad_grades, \
             notify_absences, notify_late, notify_homework_assigned, notify_homework_deadline, \
             bad_grade_threshold, homework_deadline_days, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             ON CONFLICT (guardian_id, student_id) DO UPDATE SET guardian_id = EXCLUDED.guardian_id \
             RETURNING *",
        )
        .bind(defaults.guardian_id)
        .bind(defaults.student_id)
        .bind(defaults.notify_bad_grades)
        .bind(defaults.notify_absences)
        .bind(defaults.notify_late)
        .bind(defaults.notify_homework_assigned)
        .bind(defaults.notify_homework_deadline)
        .bind(defaults.bad_grade_threshold)
        .bind(defaults.homework_deadline_days)
        .bind(defaults.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load preferences", e))
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn get_or_create(
        &self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::get_or_create_in(&mut conn, guardian_id, student_id).await
    }

    async fn update(
        &self,
        guardian_id: UserId,
        student_id: UserId,
        changes: &PreferenceUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<NotificationPreference> {
        // Insert path: defaults with the changes applied. Conflict path: only
        // the columns that were set are overwritten.
        let mut fresh = NotificationPreference::defaults(guardian_id, student_id);
        fresh.apply(changes, at);

        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO guardian_notification_preferences AS p (guardian_id, student_id, \
             notify_bad_grades, notify_absences, notify_late, notify_homework_assigned, \
             notify_homework_deadline, bad_grade_threshold, homework_deadline_days, created_at, \
             updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             ON CONFLICT (guardian_id, student_id) DO UPDATE SET \
             notify_bad_grades = COALESCE($11, p.notify_bad_grades), \
             notify_absences = COALESCE($12, p.notify_absences), \
             notify_late = COALESCE($13, p.notify_late), \
             notify_homework_assigned = COALESCE($14, p.notify_homework_assigned), \
             notify_homework_deadline = COALESCE($15, p.notify_homework_deadline), \
             bad_grade_threshold = COALESCE($16, p.bad_grade_threshold), \
             homework_deadline_days = COALESCE($17, p.homework_deadline_days), \
             updated_at = $10 \
             RETURNING *",
        )
        .bind(guardian_id)
        .bind(student_id)
        .bind(fresh.notify_bad_grades)
        .bind(fresh.notify_absences)
        .bind(fresh.notify_late)
        .bind(fresh.notify_homework_assigned)
        .bind(fresh.notify_homework_deadline)
        .bind(fresh.bad_grade_threshold)
        .bind(fresh.homework_deadline_days)
        .bind(at)
        .bind(changes.notify_bad_grades)
        .bind(changes.notify_absences)
        .bind(changes.notify_late)
        .bind(changes.notify_homework_assigned)
        .bind(changes.notify_homework_deadline)
        .bind(changes.bad_grade_threshold)
        .bind(changes.homework_deadline_days)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update preferences", e))
    }
}
