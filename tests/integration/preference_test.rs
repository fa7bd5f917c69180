//! Integration tests for guardian preferences.

mod helpers;

use std::sync::Arc;

use eduhub_core::error::ErrorKind;
use eduhub_core::events::AttendanceStatus;
use eduhub_core::types::id::UserId;
use eduhub_entity::notification::PreferenceUpdate;
use eduhub_entity::notification::preference::{
    DEFAULT_BAD_GRADE_THRESHOLD, DEFAULT_HOMEWORK_DEADLINE_DAYS,
};

use helpers::{TestApp, attendance_event, grade_event};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_reads_create_one_row() {
    let app = TestApp::new();
    let guardian = UserId::new();
    let student = UserId::new();

    let reads = (0..16).map(|_| {
        let preferences = app.preferences.clone();
        tokio::spawn(async move { preferences.get(guardian, student).await })
    });
    let results = futures::future::join_all(reads).await;

    for result in results {
        let preference = result.unwrap().unwrap();
        assert!(preference.notify_bad_grades);
        assert!(preference.notify_absences);
        assert!(preference.notify_late);
        assert!(preference.notify_homework_assigned);
        assert!(!preference.notify_homework_deadline);
        assert_eq!(preference.bad_grade_threshold, DEFAULT_BAD_GRADE_THRESHOLD);
        assert_eq!(
            preference.homework_deadline_days,
            DEFAULT_HOMEWORK_DEADLINE_DAYS
        );
    }
    assert_eq!(app.store.preference_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_events_for_same_pair_create_one_row() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;
    assert!(app.store.stored_preference(guardian, student).await.is_none());

    let handles: Vec<_> = (1..=3i16)
        .map(|value| {
            let orchestrator = Arc::clone(&app.orchestrator);
            tokio::spawn(async move { orchestrator.handle(&grade_event(student, value)).await })
        })
        .collect();
    for outcome in futures::future::join_all(handles).await {
        assert!(outcome.unwrap().is_committed());
    }

    assert_eq!(app.store.preference_count().await, 1);
    assert_eq!(app.store.notifications_for(guardian).await.len(), 3);
}

#[tokio::test]
async fn test_fan_out_materializes_defaults() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;

    app.orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Late))
        .await;

    let stored = app
        .store
        .stored_preference(guardian, student)
        .await
        .expect("defaults persisted by fan-out");
    assert_eq!(stored.bad_grade_threshold, DEFAULT_BAD_GRADE_THRESHOLD);
}

#[tokio::test]
async fn test_out_of_range_updates_are_rejected() {
    let app = TestApp::new();
    let guardian = UserId::new();
    let student = UserId::new();

    for update in [
        PreferenceUpdate {
            bad_grade_threshold: Some(0),
            ..Default::default()
        },
        PreferenceUpdate {
            bad_grade_threshold: Some(6),
            ..Default::default()
        },
        PreferenceUpdate {
            homework_deadline_days: Some(0),
            ..Default::default()
        },
        PreferenceUpdate {
            homework_deadline_days: Some(31),
            ..Default::default()
        },
    ] {
        let err = app
            .preferences
            .update(guardian, student, update)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    // Rejected updates never create a row.
    assert_eq!(app.store.preference_count().await, 0);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let app = TestApp::new();
    let guardian = UserId::new();
    let student = UserId::new();

    let updated = app
        .preferences
        .update(
            guardian,
            student,
            PreferenceUpdate {
                homework_deadline_days: Some(30),
                notify_homework_deadline: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.homework_deadline_days, 30);
    assert!(updated.notify_homework_deadline);
    assert_eq!(updated.bad_grade_threshold, DEFAULT_BAD_GRADE_THRESHOLD);

    let unchanged = app
        .preferences
        .update(guardian, student, PreferenceUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged, updated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_partial_updates_keep_both_changes() {
    let app = TestApp::new();
    let guardian = UserId::new();
    let student = UserId::new();

    let lowers_threshold = {
        let preferences = app.preferences.clone();
        tokio::spawn(async move {
            preferences
                .update(
                    guardian,
                    student,
                    PreferenceUpdate {
                        bad_grade_threshold: Some(2),
                        ..Default::default()
                    },
                )
                .await
        })
    };
    let mutes_late = {
        let preferences = app.preferences.clone();
        tokio::spawn(async move {
            preferences
                .update(
                    guardian,
                    student,
                    PreferenceUpdate {
                        notify_late: Some(false),
                        ..Default::default()
                    },
                )
                .await
        })
    };
    lowers_threshold.await.unwrap().unwrap();
    mutes_late.await.unwrap().unwrap();

    let stored = app
        .store
        .stored_preference(guardian, student)
        .await
        .expect("row created by the first update");
    assert_eq!(stored.bad_grade_threshold, 2);
    assert!(!stored.notify_late);
    assert!(stored.notify_absences);
    assert_eq!(app.store.preference_count().await, 1);
}

#[tokio::test]
async fn test_toggles_change_fan_out() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;

    app.preferences
        .update(
            guardian,
            student,
            PreferenceUpdate {
                notify_bad_grades: Some(false),
                notify_absences: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.orchestrator.handle(&grade_event(student, 1)).await;
    app.orchestrator
        .handle(&attendance_event(student, AttendanceStatus::Absent))
        .await;
    assert!(app.store.notifications_for(guardian).await.is_empty());
    assert_eq!(app.store.notifications_for(student).await.len(), 2);

    app.preferences
        .update(
            guardian,
            student,
            PreferenceUpdate {
                notify_bad_grades: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.orchestrator.handle(&grade_event(student, 1)).await;
    assert_eq!(app.store.notifications_for(guardian).await.len(), 1);
}
