//! In-memory store using a Tokio mutex for single-node runs and tests.
//!
//! Implements every store trait with the same observable semantics as the
//! PostgreSQL repositories: pair uniqueness for relationships and
//! preferences, and all-or-nothing visibility for fan-out units.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use eduhub_core::error::AppError;
use eduhub_core::result::AppResult;
use eduhub_core::types::id::{NotificationId, RelationshipId, UserId};
use eduhub_core::types::pagination::{PageRequest, PageResponse};
use eduhub_entity::notification::{
    Notification, NotificationDraft, NotificationFilter, NotificationPreference, PreferenceUpdate,
};
use eduhub_entity::relationship::{Relationship, RelationshipStatus};

use crate::store::{
    FanoutStore, FanoutUnit, NotificationSink, PreferenceStore, RelationshipDirectory,
    RelationshipStore,
};

/// Internal state shared by every clone of a [`MemoryStore`].
#[derive(Debug, Default)]
struct MemoryState {
    /// Relationships by ID.
    relationships: HashMap<RelationshipId, Relationship>,
    /// Preferences keyed by (guardian, student).
    preferences: HashMap<(UserId, UserId), NotificationPreference>,
    /// Committed notifications in insertion order.
    notifications: Vec<Notification>,
    /// Recipients whose inserts fail (simulated constraint violations).
    failing_recipients: HashSet<UserId>,
}

impl MemoryState {
    fn active_guardians_of(&self, student_id: UserId) -> Vec<UserId> {
        self.relationships
            .values()
            .filter(|r| r.student_id == student_id && r.is_active())
            .map(|r| r.guardian_id)
            .collect()
    }

    fn check_insertable(&self, recipient_id: UserId) -> AppResult<()> {
        if self.failing_recipients.contains(&recipient_id) {
            return Err(AppError::database(format!(
                "insert or update on table \"notifications\" violates foreign key constraint \
                 (recipient {recipient_id})"
            )));
        }
        Ok(())
    }
}

/// Thread-safe in-memory implementation of all store traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert for `recipient_id` fail, as a dangling foreign
    /// key would in PostgreSQL.
    pub async fn fail_inserts_for(&self, recipient_id: UserId) {
        self.state.lock().await.failing_recipients.insert(recipient_id);
    }

    /// Committed notifications of one recipient, oldest first.
    pub async fn notifications_for(&self, recipient_id: UserId) -> Vec<Notification> {
        self.state
            .lock()
            .await
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    /// Total number of committed notifications.
    pub async fn notification_count(&self) -> usize {
        self.state.lock().await.notifications.len()
    }

    /// Total number of stored preference rows.
    pub async fn preference_count(&self) -> usize {
        self.state.lock().await.preferences.len()
    }

    /// Stored preference for a pair, without creating one.
    pub async fn stored_preference(
        &self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> Option<NotificationPreference> {
        self.state
            .lock()
            .await
            .preferences
            .get(&(guardian_id, student_id))
            .cloned()
    }
}

#[async_trait]
impl RelationshipDirectory for MemoryStore {
    async fn active_guardians_of(&self, student_id: UserId) -> AppResult<Vec<UserId>> {
        Ok(self.state.lock().await.active_guardians_of(student_id))
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn create(&self, relationship: &Relationship) -> AppResult<Relationship> {
        let mut state = self.state.lock().await;
        let duplicate = state.relationships.values().any(|r| {
            r.guardian_id == relationship.guardian_id && r.student_id == relationship.student_id
        });
        if duplicate {
            return Err(AppError::conflict(format!(
                "Guardian {} is already linked to student {}",
                relationship.guardian_id, relationship.student_id
            )));
        }
        state
            .relationships
            .insert(relationship.id, relationship.clone());
        Ok(relationship.clone())
    }

    async fn find_by_id(&self, id: RelationshipId) -> AppResult<Option<Relationship>> {
        Ok(self.state.lock().await.relationships.get(&id).cloned())
    }

    async fn save_status(
        &self,
        relationship: &Relationship,
        expected: RelationshipStatus,
    ) -> AppResult<Relationship> {
        let mut state = self.state.lock().await;
        let stored = state
            .relationships
            .get_mut(&relationship.id)
            .ok_or_else(|| {
                AppError::not_found(format!("Relationship {} not found", relationship.id))
            })?;
        if stored.status != expected {
            return Err(AppError::conflict(format!(
                "Relationship {} is {}, expected {}",
                relationship.id, stored.status, expected
            )));
        }
        stored.status = relationship.status;
        stored.verified_at = relationship.verified_at;
        stored.rejection_reason = relationship.rejection_reason.clone();
        stored.updated_at = relationship.updated_at;
        Ok(stored.clone())
    }

    async fn find_for_student(&self, student_id: UserId) -> AppResult<Vec<Relationship>> {
        let state = self.state.lock().await;
        let mut found: Vec<Relationship> = state
            .relationships
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(found)
    }

    async fn find_for_guardian(&self, guardian_id: UserId) -> AppResult<Vec<Relationship>> {
        let state = self.state.lock().await;
        let mut found: Vec<Relationship> = state
            .relationships
            .values()
            .filter(|r| r.guardian_id == guardian_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_or_create(
        &self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        // Lookup and insert happen under one lock acquisition.
        let mut state = self.state.lock().await;
        let pref = state
            .preferences
            .entry((guardian_id, student_id))
            .or_insert_with(|| NotificationPreference::defaults(guardian_id, student_id));
        Ok(pref.clone())
    }

    async fn update(
        &self,
        guardian_id: UserId,
        student_id: UserId,
        changes: &PreferenceUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<NotificationPreference> {
        let mut state = self.state.lock().await;
        let pref = state
            .preferences
            .entry((guardian_id, student_id))
            .or_insert_with(|| NotificationPreference::defaults(guardian_id, student_id));
        pref.apply(changes, at);
        Ok(pref.clone())
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn persist(&self, draft: NotificationDraft) -> AppResult<NotificationId> {
        let mut state = self.state.lock().await;
        state.check_insertable(draft.recipient_id)?;
        let notification = Notification::from_draft(draft, Utc::now());
        let id = notification.id;
        state.notifications.push(notification);
        Ok(id)
    }

    async fn find(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>> {
        Ok(self
            .state
            .lock()
            .await
            .notifications
            .iter()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
            .cloned())
    }

    async fn list(
        &self,
        recipient_id: UserId,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let now = Utc::now();
        let state = self.state.lock().await;
        let mut matching: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && filter.matches(n, now))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
            .map(|n| n.mark_read(at))
            .unwrap_or(false))
    }

    async fn mark_unread(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
            .map(|n| n.mark_unread())
            .unwrap_or(false))
    }

    async fn mark_all_read(&self, recipient_id: UserId, at: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let changed = state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id)
            .map(|n| n.mark_read(at))
            .filter(|changed| *changed)
            .count();
        Ok(changed as u64)
    }

    async fn count_unread(&self, recipient_id: UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.is_unread() && !n.is_expired_at(now))
            .count() as u64)
    }

    async fn purge(&self, read_before: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.is_expired_at(now) || (n.is_read && n.created_at < read_before)));
        Ok((before - state.notifications.len()) as u64)
    }
}

#[async_trait]
impl FanoutStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn FanoutUnit>> {
        Ok(Box::new(MemoryFanoutUnit {
            state: Arc::clone(&self.state),
            staged_preferences: Vec::new(),
            staged_notifications: Vec::new(),
        }))
    }
}

/// A fan-out unit that buffers writes until commit.
#[derive(Debug)]
struct MemoryFanoutUnit {
    state: Arc<Mutex<MemoryState>>,
    staged_preferences: Vec<NotificationPreference>,
    staged_notifications: Vec<Notification>,
}

#[async_trait]
impl FanoutUnit for MemoryFanoutUnit {
    async fn active_guardians_of(&mut self, student_id: UserId) -> AppResult<Vec<UserId>> {
        Ok(self.state.lock().await.active_guardians_of(student_id))
    }

    async fn preference(
        &mut self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference> {
        if let Some(stored) = self
            .state
            .lock()
            .await
            .preferences
            .get(&(guardian_id, student_id))
        {
            return Ok(stored.clone());
        }
        if let Some(staged) = self
            .staged_preferences
            .iter()
            .find(|p| p.guardian_id == guardian_id && p.student_id == student_id)
        {
            return Ok(staged.clone());
        }
        let pref = NotificationPreference::defaults(guardian_id, student_id);
        self.staged_preferences.push(pref.clone());
        Ok(pref)
    }

    async fn persist(&mut self, draft: NotificationDraft) -> AppResult<NotificationId> {
        self.state.lock().await.check_insertable(draft.recipient_id)?;
        let notification = Notification::from_draft(draft, Utc::now());
        let id = notification.id;
        self.staged_notifications.push(notification);
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let this = *self;
        let mut state = this.state.lock().await;
        for pref in this.staged_preferences {
            // A concurrent unit may have committed the same pair first.
            state
                .preferences
                .entry((pref.guardian_id, pref.student_id))
                .or_insert(pref);
        }
        debug!(
            notifications = this.staged_notifications.len(),
            "Memory fan-out committed"
        );
        state.notifications.extend(this.staged_notifications);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!(
            discarded = self.staged_notifications.len(),
            "Memory fan-out rolled back"
        );
        Ok(())
    }
}
