//! Store traits consumed by the notification engine.
//!
//! Each trait is implemented twice: by the sqlx repositories in
//! [`crate::repositories`] and by [`crate::memory::MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use eduhub_core::result::AppResult;
use eduhub_core::types::id::{NotificationId, RelationshipId, UserId};
use eduhub_core::types::pagination::{PageRequest, PageResponse};
use eduhub_entity::notification::{
    Notification, NotificationDraft, NotificationFilter, NotificationPreference, PreferenceUpdate,
};
use eduhub_entity::relationship::{Relationship, RelationshipStatus};

/// Resolves the guardians currently authorized to follow a student.
#[async_trait]
pub trait RelationshipDirectory: Send + Sync + 'static {
    /// IDs of guardians whose relationship with the student is `active`.
    ///
    /// No ordering is guaranteed. An empty list is a normal result.
    async fn active_guardians_of(&self, student_id: UserId) -> AppResult<Vec<UserId>>;
}

/// Persistence for guardian-student relationship records.
#[async_trait]
pub trait RelationshipStore: RelationshipDirectory {
    /// Insert a new relationship. Fails with `Conflict` if the pair exists
    /// in any status.
    async fn create(&self, relationship: &Relationship) -> AppResult<Relationship>;

    /// Find a relationship by ID.
    async fn find_by_id(&self, id: RelationshipId) -> AppResult<Option<Relationship>>;

    /// Persist the status fields of a relationship after a transition.
    ///
    /// The write only applies while the stored status still equals
    /// `expected`; otherwise it fails with `Conflict` and leaves the row
    /// untouched.
    async fn save_status(
        &self,
        relationship: &Relationship,
        expected: RelationshipStatus,
    ) -> AppResult<Relationship>;

    /// All relationships of a student, in any status.
    async fn find_for_student(&self, student_id: UserId) -> AppResult<Vec<Relationship>>;

    /// All relationships of a guardian, in any status.
    async fn find_for_guardian(&self, guardian_id: UserId) -> AppResult<Vec<Relationship>>;
}

/// Loads or lazily materializes per-pair notification preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Return the preference for the pair, creating the default record if
    /// none exists. Concurrent first calls for the same pair must yield a
    /// single stored row.
    async fn get_or_create(
        &self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference>;

    /// Apply the set fields of `changes` in one atomic write, creating the
    /// default record first if none exists. Fields left `None` keep their
    /// stored value, so overlapping partial updates never drop each other.
    async fn update(
        &self,
        guardian_id: UserId,
        student_id: UserId,
        changes: &PreferenceUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<NotificationPreference>;
}

/// Persists notifications and exposes their read state.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Insert a notification outside of any fan-out transaction.
    async fn persist(&self, draft: NotificationDraft) -> AppResult<NotificationId>;

    /// Find one of a recipient's notifications.
    async fn find(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>>;

    /// List a recipient's notifications, newest first.
    async fn list(
        &self,
        recipient_id: UserId,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Mark one notification as read. Returns `false` when nothing changed.
    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Mark one notification as unread. Returns `false` when nothing changed.
    async fn mark_unread(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool>;

    /// Mark every unread notification of a recipient as read.
    async fn mark_all_read(&self, recipient_id: UserId, at: DateTime<Utc>) -> AppResult<u64>;

    /// Count a recipient's unread, unexpired notifications.
    async fn count_unread(&self, recipient_id: UserId, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete expired notifications and read notifications created before
    /// `read_before`.
    async fn purge(&self, read_before: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<u64>;
}

/// The directory, preference store and sink bound to one transaction.
///
/// Nothing written through a unit is visible to other readers until
/// [`FanoutUnit::commit`]; dropping or rolling back discards every write.
#[async_trait]
pub trait FanoutUnit: Send {
    /// See [`RelationshipDirectory::active_guardians_of`].
    async fn active_guardians_of(&mut self, student_id: UserId) -> AppResult<Vec<UserId>>;

    /// See [`PreferenceStore::get_or_create`].
    async fn preference(
        &mut self,
        guardian_id: UserId,
        student_id: UserId,
    ) -> AppResult<NotificationPreference>;

    /// Insert a notification inside the transaction.
    async fn persist(&mut self, draft: NotificationDraft) -> AppResult<NotificationId>;

    /// Make every write of this unit visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write of this unit.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Opens fan-out transactions.
#[async_trait]
pub trait FanoutStore: Send + Sync + 'static {
    /// Begin a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn FanoutUnit>>;
}
