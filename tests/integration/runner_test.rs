//! Integration tests for the fan-out runner.

mod helpers;

use std::sync::Arc;

use tokio::sync::watch;

use eduhub_core::config::WorkerConfig;
use eduhub_core::events::{AttendanceStatus, StudentRef};
use eduhub_core::types::id::UserId;
use eduhub_worker::{FanoutRunner, RunSummary, event_channel};

use helpers::{TestApp, attendance_event, grade_event, homework_event};

fn runner(app: &TestApp, concurrency: usize) -> FanoutRunner {
    FanoutRunner::new(
        Arc::clone(&app.orchestrator),
        WorkerConfig {
            enabled: true,
            concurrency,
            shutdown_grace_seconds: 5,
        },
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_ends_when_publishers_drop() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = app.active_guardian(student).await;
    let broken = UserId::new();
    let broken_guardian = app.active_guardian(broken).await;
    app.store.fail_inserts_for(broken_guardian).await;

    let (publisher, events) = event_channel(16);
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let runner = runner(&app, 4);
    let handle = tokio::spawn(async move { runner.run(events, cancel_rx).await });

    publisher.publish(grade_event(student, 2)).await.unwrap();
    publisher
        .publish(attendance_event(student, AttendanceStatus::Present))
        .await
        .unwrap();
    publisher
        .publish(attendance_event(broken, AttendanceStatus::Late))
        .await
        .unwrap();
    publisher.publish(homework_event(Vec::new())).await.unwrap();
    publisher
        .publish(homework_event(vec![StudentRef::new(student, "Алексей")]))
        .await
        .unwrap();
    drop(publisher);

    let summary = handle.await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            dispatched: 5,
            committed: 2,
            skipped: 2,
            rolled_back: 1,
        }
    );
    assert_eq!(app.store.notifications_for(guardian).await.len(), 2);
    assert!(app.store.notifications_for(broken).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_still_handles_buffered_events() {
    let app = TestApp::new();
    let student = UserId::new();

    let (publisher, events) = event_channel(8);
    for value in [1, 4, 5] {
        publisher.publish(grade_event(student, value)).await.unwrap();
    }
    let (cancel_tx, cancel_rx) = watch::channel(false);
    cancel_tx.send(true).unwrap();

    let summary = runner(&app, 1).run(events, cancel_rx).await;
    assert_eq!(summary.dispatched, 3);
    assert_eq!(summary.committed, 3);
    assert_eq!(app.store.notifications_for(student).await.len(), 3);

    // The runner no longer accepts events.
    assert!(publisher.is_closed());
    assert!(publisher.publish(grade_event(student, 2)).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_events_keep_per_event_atomicity() {
    let app = TestApp::new();
    let mut students = Vec::new();
    for _ in 0..10 {
        let student = UserId::new();
        app.active_guardian(student).await;
        students.push(student);
    }

    let (publisher, events) = event_channel(32);
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let runner = runner(&app, 4);
    let handle = tokio::spawn(async move { runner.run(events, cancel_rx).await });

    for student in &students {
        publisher
            .publish(attendance_event(*student, AttendanceStatus::Absent))
            .await
            .unwrap();
    }
    drop(publisher);

    let summary = handle.await.unwrap();
    assert_eq!(summary.committed, students.len());
    assert_eq!(app.store.notification_count().await, students.len() * 2);
}
