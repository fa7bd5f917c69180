//! Integration tests for guardian links.

mod helpers;

use eduhub_core::error::ErrorKind;
use eduhub_core::events::AttendanceStatus;
use eduhub_core::types::id::UserId;
use eduhub_entity::relationship::{CreateRelationship, RelationshipKind, RelationshipStatus};

use helpers::{TestApp, attendance_event};

fn request(guardian_id: UserId, student_id: UserId, is_primary: bool) -> CreateRelationship {
    CreateRelationship {
        guardian_id,
        student_id,
        kind: RelationshipKind::Father,
        is_primary,
        created_by: None,
    }
}

#[tokio::test]
async fn test_duplicate_pair_conflicts() {
    let app = TestApp::new();
    let guardian = UserId::new();
    let student = UserId::new();

    app.relationships
        .link(request(guardian, student, false))
        .await
        .unwrap();
    let err = app
        .relationships
        .link(request(guardian, student, true))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    assert_eq!(
        app.relationships.list_for_student(student).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_rejected_link_cannot_be_approved() {
    let app = TestApp::new();
    let link = app
        .relationships
        .link(request(UserId::new(), UserId::new(), false))
        .await
        .unwrap();

    app.relationships
        .reject(link.id, "unknown person")
        .await
        .unwrap();
    let err = app.relationships.approve(link.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app.relationships.revoke(link.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_pending_link_cannot_be_revoked() {
    let app = TestApp::new();
    let link = app
        .relationships
        .link(request(UserId::new(), UserId::new(), false))
        .await
        .unwrap();

    let err = app.relationships.revoke(link.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_lists_show_every_status_primary_first() {
    let app = TestApp::new();
    let student = UserId::new();
    let father = UserId::new();
    let mother = UserId::new();

    app.relationships
        .link(request(father, student, false))
        .await
        .unwrap();
    let primary = app
        .relationships
        .link(request(mother, student, true))
        .await
        .unwrap();
    app.relationships.approve(primary.id).await.unwrap();

    let links = app.relationships.list_for_student(student).await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].guardian_id, mother);
    assert_eq!(links[0].status, RelationshipStatus::Active);
    assert_eq!(links[1].status, RelationshipStatus::Pending);

    let for_father = app.relationships.list_for_guardian(father).await.unwrap();
    assert_eq!(for_father.len(), 1);
    assert_eq!(for_father[0].student_id, student);
}

#[tokio::test]
async fn test_guardian_hears_only_while_link_is_active() {
    let app = TestApp::new();
    let student = UserId::new();
    let guardian = UserId::new();
    let absent = || attendance_event(student, AttendanceStatus::Absent);

    let link = app
        .relationships
        .link(request(guardian, student, true))
        .await
        .unwrap();
    app.orchestrator.handle(&absent()).await;
    assert!(app.store.notifications_for(guardian).await.is_empty());

    app.relationships.approve(link.id).await.unwrap();
    app.orchestrator.handle(&absent()).await;
    assert_eq!(app.store.notifications_for(guardian).await.len(), 1);

    app.relationships.revoke(link.id).await.unwrap();
    app.orchestrator.handle(&absent()).await;
    assert_eq!(app.store.notifications_for(guardian).await.len(), 1);

    // The student is notified every time.
    assert_eq!(app.store.notifications_for(student).await.len(), 3);
}
