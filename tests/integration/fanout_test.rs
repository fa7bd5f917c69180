//! Integration tests for event fan-out.

mod helpers;

use eduhub_core::config::NotificationConfig;
use eduhub_core::error::ErrorKind;
use eduhub_core::events::{AttendanceStatus, StudentRef};
use eduhub_core::types::id::UserId;
use eduhub_entity::notification::{
    NotificationCategory, NotificationPriority, NotificationType, PreferenceUpdate,
};
use eduhub_entity::relationship::{CreateRelationship, RelationshipKind, RelationshipStatus};
use eduhub_service::{FanoutOutcome, SkipReason};

use helpers::{TestApp, attendance_event, grade_event, homework_event};

#[tokio::test]
async fn test_bad_grade_reaches_student_and_mother() {
    let app = TestApp::new();
    let student = UserId::new();
    let mother = app.active_guardian(student).await;

    let outcome = app.orchestrator.handle(&grade_event(student, 2)).await;
    assert!(outcome.is_committed());

    let to_student = app.store.notifications_for(student).await;
    assert_eq!(to_student.len(), 1);
    assert_eq!(to_student[0].title, "Получена неудовлетворительная оценка");
    assert_eq!(to_student[0].notification_type, NotificationType::BadGrade);
    assert_eq!(to_student[0].priority, NotificationPriority::High);
    assert_eq!(to_student[0].data["subject_name"], "Math");

    let to_mother = app.store.notifications_for(mother).await;
    assert_eq!(to_mother.len(), 1);
    assert_eq!(to_mother[0].title, "Неудовлетворительная оценка у ребенка");
    assert_eq!(to_mother[0].notification_type, NotificationType::BadGrade);
    assert_eq!(to_mother[0].priority, NotificationPriority::High);
    assert_eq!(to_mother[0].data["student_name"], "Алексей Смирнов");
}

#[tokio::test]
async fn test_strict_threshold_spares_guardian() {
    let app = TestApp::new();
    let student = UserId::new();
    let mother = app.active_guardian(student).await;
    app.preferences
        .update(
            mother,
            student,
            PreferenceUpdate {
                bad_grade_threshold: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    app.orchestrator.handle(&grade_event(student, 2)).await;

    assert_eq!(app.store.notifications_for(student).await.len(), 1);
    assert!(app.store.notifications_for(mother).await.is_empty());
}

#[tokio::test]
async fn test_threshold_boundary() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;

    app.orchestrator.handle(&grade_event(student, 3)).await;
    assert_eq!(app.store.notifications_for(guardian).await.len(), 1);

    app.orchestrator.handle(&grade_event(student, 4)).await;
    assert_eq!(app.store.notifications_for(guardian).await.len(), 1);
}

#[tokio::test]
async fn test_bad_grades_follow_each_guardian_threshold() {
    for threshold in 1..=5i16 {
        for value in 1..=3i16 {
            let app = TestApp::new();
            let student = UserId::new();
            let guardian = app.active_guardian(student).await;
            app.preferences
                .update(
                    guardian,
                    student,
                    PreferenceUpdate {
                        bad_grade_threshold: Some(threshold),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            app.orchestrator.handle(&grade_event(student, value)).await;

            let student_notes = app.store.notifications_for(student).await;
            assert_eq!(student_notes.len(), 1);
            assert_eq!(student_notes[0].notification_type, NotificationType::BadGrade);
            let expected = usize::from(value <= threshold);
            assert_eq!(
                app.store.notifications_for(guardian).await.len(),
                expected,
                "threshold={threshold} value={value}"
            );
        }
    }
}

#[tokio::test]
async fn test_good_grades_never_reach_guardians() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;
    app.preferences
        .update(
            guardian,
            student,
            PreferenceUpdate {
                notify_bad_grades: Some(true),
                bad_grade_threshold: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for value in [4, 5] {
        let outcome = app.orchestrator.handle(&grade_event(student, value)).await;
        assert!(matches!(
            outcome,
            FanoutOutcome::Committed {
                student_notifications: 1,
                guardian_notifications: 0
            }
        ));
    }

    let to_student = app.store.notifications_for(student).await;
    assert_eq!(to_student.len(), 2);
    assert!(to_student.iter().all(|n| {
        n.notification_type == NotificationType::GoodGrade
            && n.priority == NotificationPriority::Medium
            && n.category == NotificationCategory::Academic
    }));
    assert!(app.store.notifications_for(guardian).await.is_empty());
}

#[tokio::test]
async fn test_configured_bad_grade_boundary() {
    let app = TestApp::with_config(NotificationConfig {
        bad_grade_max: 2,
        ..Default::default()
    });
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;

    app.orchestrator.handle(&grade_event(student, 3)).await;

    let to_student = app.store.notifications_for(student).await;
    assert_eq!(to_student[0].notification_type, NotificationType::GoodGrade);
    assert!(app.store.notifications_for(guardian).await.is_empty());
}

#[tokio::test]
async fn test_present_sick_and_excused_create_nothing() {
    let app = TestApp::new();
    let student = UserId::new();
    app.active_guardian(student).await;

    for status in [
        AttendanceStatus::Present,
        AttendanceStatus::Sick,
        AttendanceStatus::Excused,
    ] {
        let outcome = app
            .orchestrator
            .handle(&attendance_event(student, status))
            .await;
        assert!(matches!(
            outcome,
            FanoutOutcome::Skipped {
                reason: SkipReason::AttendanceStatus(s)
            } if s == status
        ));
    }
    assert_eq!(app.store.notification_count().await, 0);
    assert_eq!(app.store.preference_count().await, 0);
}

#[tokio::test]
async fn test_absence_and_late_follow_toggles() {
    let app = TestApp::new();
    let student = UserId::new();
    let both = app.active_guardian(student).await;
    let absences_only = app.active_guardian(student).await;
    app.preferences
        .update(
            absences_only,
            student,
            PreferenceUpdate {
                notify_late: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let absent = app
        .orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Absent))
        .await;
    assert!(matches!(
        absent,
        FanoutOutcome::Committed {
            student_notifications: 1,
            guardian_notifications: 2
        }
    ));

    let late = app
        .orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Late))
        .await;
    assert!(matches!(
        late,
        FanoutOutcome::Committed {
            student_notifications: 1,
            guardian_notifications: 1
        }
    ));

    let kinds = |notes: Vec<eduhub_entity::notification::Notification>| {
        notes
            .into_iter()
            .map(|n| n.notification_type)
            .collect::<Vec<_>>()
    };
    assert_eq!(
        kinds(app.store.notifications_for(both).await),
        vec![NotificationType::Absence, NotificationType::Late]
    );
    assert_eq!(
        kinds(app.store.notifications_for(absences_only).await),
        vec![NotificationType::Absence]
    );

    let absence = &app.store.notifications_for(student).await[0];
    assert_eq!(absence.priority, NotificationPriority::High);
    assert_eq!(absence.category, NotificationCategory::Attendance);
    assert_eq!(absence.data["lesson_number"], 3);
    assert_eq!(absence.data["teacher_name"], "Неизвестный учитель");
}

#[tokio::test]
async fn test_inactive_relationships_are_ignored() {
    let app = TestApp::new();
    let student = UserId::new();
    let mut silent = Vec::new();
    for status in [
        RelationshipStatus::Pending,
        RelationshipStatus::Rejected,
        RelationshipStatus::Revoked,
    ] {
        let guardian = app
            .guardian_with_status(student, RelationshipKind::Father, status)
            .await;
        app.preferences
            .update(
                guardian,
                student,
                PreferenceUpdate {
                    notify_bad_grades: Some(true),
                    notify_absences: Some(true),
                    notify_late: Some(true),
                    notify_homework_assigned: Some(true),
                    notify_homework_deadline: Some(true),
                    bad_grade_threshold: Some(5),
                    homework_deadline_days: None,
                },
            )
            .await
            .unwrap();
        silent.push(guardian);
    }

    app.orchestrator.handle(&grade_event(student, 1)).await;
    app.orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Absent))
        .await;
    app.orchestrator
        .handle(&homework_event(vec![StudentRef::new(student, "Алексей")]))
        .await;

    assert_eq!(app.store.notifications_for(student).await.len(), 3);
    for guardian in silent {
        assert!(app.store.notifications_for(guardian).await.is_empty());
    }
}

#[tokio::test]
async fn test_homework_fans_out_per_student() {
    let app = TestApp::new();
    let (anna, boris) = (UserId::new(), UserId::new());
    let shared = app.active_guardian(anna).await;
    let second_link = app
        .relationships
        .link(CreateRelationship {
            guardian_id: shared,
            student_id: boris,
            kind: RelationshipKind::Mother,
            is_primary: true,
            created_by: None,
        })
        .await
        .unwrap();
    app.relationships.approve(second_link.id).await.unwrap();

    let outcome = app
        .orchestrator
        .handle(&homework_event(vec![
            StudentRef::new(anna, "Анна"),
            StudentRef::new(boris, "Борис"),
        ]))
        .await;
    assert!(matches!(
        outcome,
        FanoutOutcome::Committed {
            student_notifications: 2,
            guardian_notifications: 2
        }
    ));

    let to_guardian = app.store.notifications_for(shared).await;
    let names: Vec<_> = to_guardian
        .iter()
        .map(|n| n.data["student_name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Анна".to_string(), "Борис".to_string()]);
    assert!(to_guardian.iter().all(|n| {
        n.notification_type == NotificationType::HomeworkAssigned
            && n.priority == NotificationPriority::Medium
            && n.category == NotificationCategory::Homework
            && n.data["due_date"] == "2024-11-20"
    }));
}

#[tokio::test]
async fn test_homework_for_empty_class_is_skipped() {
    let app = TestApp::new();
    let outcome = app.orchestrator.handle(&homework_event(Vec::new())).await;
    assert!(matches!(
        outcome,
        FanoutOutcome::Skipped {
            reason: SkipReason::NoStudents
        }
    ));
    assert_eq!(app.store.notification_count().await, 0);
}

#[tokio::test]
async fn test_one_failing_guardian_rolls_back_the_event() {
    let app = TestApp::new();
    let student = UserId::new();
    let healthy = app.active_guardian(student).await;
    let stale = app.active_guardian(student).await;
    app.store.fail_inserts_for(stale).await;

    let outcome = app
        .orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Absent))
        .await;
    match outcome {
        FanoutOutcome::RolledBack { error } => assert_eq!(error.kind, ErrorKind::Database),
        other => panic!("expected rollback, got {other:?}"),
    }
    assert!(app.store.notifications_for(student).await.is_empty());
    assert!(app.store.notifications_for(healthy).await.is_empty());

    // A later event for another student is unaffected.
    let other = UserId::new();
    let other_guardian = app.active_guardian(other).await;
    let outcome = app
        .orchestrator
        .handle(&attendance_event(other, AttendanceStatus::Absent))
        .await;
    assert_eq!(outcome.notification_count(), 2);
    assert_eq!(app.store.notifications_for(other_guardian).await.len(), 1);
}

#[tokio::test]
async fn test_committed_notifications_are_readable() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;
    app.orchestrator.handle(&grade_event(student, 2)).await;

    assert_eq!(app.notifications.unread_count(guardian).await.unwrap(), 1);
    let id = app.store.notifications_for(guardian).await[0].id;
    app.notifications.mark_read(guardian, id).await.unwrap();
    app.notifications.mark_read(guardian, id).await.unwrap();
    assert_eq!(app.notifications.unread_count(guardian).await.unwrap(), 0);

    // No loader registered for grades in this app.
    assert!(
        app.notifications
            .related_entity(guardian, id)
            .await
            .unwrap()
            .is_none()
    );
}
