//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::NaiveDate;

use eduhub_core::config::NotificationConfig;
use eduhub_core::events::{
    AttendanceMarked, AttendanceStatus, DomainEvent, GradeRecorded, HomeworkAssigned, StudentRef,
};
use eduhub_core::types::id::{AttendanceId, GradeId, HomeworkId, SubjectId, UserId};
use eduhub_database::MemoryStore;
use eduhub_entity::relationship::{CreateRelationship, RelationshipKind, RelationshipStatus};
use eduhub_service::{
    FanoutOrchestrator, NotificationService, PreferenceService, RelatedEntityRegistry,
    RelationshipService,
};

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Test application context wired against the in-memory store
pub struct TestApp {
    /// Backing store shared by every service
    pub store: MemoryStore,
    /// Fan-out engine
    pub orchestrator: Arc<FanoutOrchestrator>,
    /// Relationship management
    pub relationships: RelationshipService,
    /// Guardian preferences
    pub preferences: PreferenceService,
    /// Read state
    pub notifications: NotificationService,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(NotificationConfig::default())
    }

    /// Create a new test application with the given notification settings
    pub fn with_config(config: NotificationConfig) -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let orchestrator = Arc::new(FanoutOrchestrator::new(Arc::new(store.clone()), &config));
        Self {
            relationships: RelationshipService::new(Arc::new(store.clone())),
            preferences: PreferenceService::new(Arc::new(store.clone())),
            notifications: NotificationService::new(
                Arc::new(store.clone()),
                Arc::new(RelatedEntityRegistry::new()),
            ),
            orchestrator,
            store,
        }
    }

    /// Link a new guardian to `student` and drive the link to `status`
    pub async fn guardian_with_status(
        &self,
        student: UserId,
        kind: RelationshipKind,
        status: RelationshipStatus,
    ) -> UserId {
        let guardian = UserId::new();
        let link = self
            .relationships
            .link(CreateRelationship {
                guardian_id: guardian,
                student_id: student,
                kind,
                is_primary: false,
                created_by: None,
            })
            .await
            .expect("Failed to link guardian");

        match status {
            RelationshipStatus::Pending => {}
            RelationshipStatus::Active => {
                self.relationships.approve(link.id).await.expect("approve");
            }
            RelationshipStatus::Rejected => {
                self.relationships
                    .reject(link.id, "not confirmed")
                    .await
                    .expect("reject");
            }
            RelationshipStatus::Revoked => {
                self.relationships.approve(link.id).await.expect("approve");
                self.relationships.revoke(link.id).await.expect("revoke");
            }
        }
        guardian
    }

    /// Link a new active guardian to `student`
    pub async fn active_guardian(&self, student: UserId) -> UserId {
        self.guardian_with_status(student, RelationshipKind::Mother, RelationshipStatus::Active)
            .await
    }
}

/// A fixed school day
pub fn school_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 18).expect("valid date")
}

/// A grade event for `student`
pub fn grade_event(student: UserId, value: i16) -> DomainEvent {
    DomainEvent::new(
        None,
        GradeRecorded {
            grade_id: GradeId::new(),
            student_id: student,
            student_name: Some("Алексей Смирнов".to_string()),
            subject_id: Some(SubjectId::new()),
            subject_name: Some("Math".to_string()),
            teacher_name: Some("Елена Викторовна".to_string()),
            value,
            grade_type: Some("test".to_string()),
            date: school_day(),
            comment: None,
        }
        .into(),
    )
}

/// An attendance event for `student`
pub fn attendance_event(student: UserId, status: AttendanceStatus) -> DomainEvent {
    DomainEvent::new(
        None,
        AttendanceMarked {
            attendance_id: AttendanceId::new(),
            student_id: student,
            student_name: Some("Алексей Смирнов".to_string()),
            subject_id: Some(SubjectId::new()),
            subject_name: Some("Химия".to_string()),
            teacher_name: None,
            date: school_day(),
            status,
            reason: None,
            arrival_time: None,
            lesson_number: 3,
        }
        .into(),
    )
}

/// A homework event for the given class
pub fn homework_event(students: Vec<StudentRef>) -> DomainEvent {
    DomainEvent::new(
        None,
        HomeworkAssigned {
            homework_id: HomeworkId::new(),
            students,
            subject_id: None,
            subject_name: Some("Литература".to_string()),
            teacher_name: Some("Ольга Николаевна".to_string()),
            title: "Прочитать главу 3".to_string(),
            description: None,
            assigned_date: school_day(),
            due_date: NaiveDate::from_ymd_opt(2024, 11, 20).expect("valid date"),
            max_points: Some(5),
        }
        .into(),
    )
}
