//! Guardian preference reads and validated updates.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use eduhub_core::error::AppError;
use eduhub_core::result::AppResult;
use eduhub_core::types::id::UserId;
use eduhub_database::store::PreferenceStore;
use eduhub_entity::notification::{NotificationPreference, PreferenceUpdate};

/// Reads and updates per-student notification preferences of guardians.
#[derive(Clone)]
pub struct PreferenceService {
    /// Preference storage.
    store: Arc<dyn PreferenceStore>,
}

impl std::fmt::Debug for PreferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceService").finish()
    }
}

impl PreferenceService {
    /// Creates a new preference service.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Gets the preference for a pair, creating the defaults on first read.
    pub async fn get(
        &self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        self.store.get_or_create(guardian_id, student_id).await
    }

    /// Validates and applies an update.
    pub async fn update(
        &self,
        guardian_id: UserId,
        student_id: UserId,
        changes: PreferenceUpdate,
    ) -> AppResult<NotificationPreference> {
        changes
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid preference update: {e}")))?;

        if changes.is_empty() {
            return self.store.get_or_create(guardian_id, student_id).await;
        }
        let saved = self
            .store
            .update(guardian_id, student_id, &changes, Utc::now())
            .await?;

        info!(
            %guardian_id,
            %student_id,
            bad_grade_threshold = saved.bad_grade_threshold,
            "Notification preferences updated"
        );
        Ok(saved)
    }
}
