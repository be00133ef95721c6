//! Allocation workflow tests: the capacity, idempotency, and atomicity
//! guarantees of direct adds, application submission, approval, rejection,
//! and bed removal.

mod common;

use sqlx::PgPool;

use common::*;
use hms::allocation::{self, WorkflowError};
use hms::models::application::{self, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use hms::models::bed::{self, NewBed, PAYMENT_PENDING};

fn direct_add(name: &str) -> NewBed {
    NewBed {
        name: name.to_string(),
        student_id: None,
        contact: None,
        email: None,
        user_id: None,
    }
}

#[sqlx::test]
async fn add_bed_allocates_lowest_free_number(pool: PgPool) {
    let cfg = test_config(5);

    let first = allocation::add_bed(&pool, &cfg, direct_add("Alice")).await.unwrap();
    assert_eq!(first.bed_no, 1);
    assert_eq!(first.payment_status, PAYMENT_PENDING);

    let second = allocation::add_bed(&pool, &cfg, direct_add("Bob")).await.unwrap();
    assert_eq!(second.bed_no, 2);

    // Free the lower number; the next add must reuse it.
    allocation::remove_bed(&pool, 1).await.unwrap();
    let third = allocation::add_bed(&pool, &cfg, direct_add("Carol")).await.unwrap();
    assert_eq!(third.bed_no, 1);
}

#[sqlx::test]
async fn add_bed_requires_name(pool: PgPool) {
    let cfg = test_config(5);
    let result = allocation::add_bed(&pool, &cfg, direct_add("   ")).await;
    assert!(matches!(result, Err(WorkflowError::Validation(_))));
    assert_eq!(bed::count(&pool).await.unwrap(), 0);
}

#[sqlx::test]
async fn add_bed_at_capacity_creates_nothing(pool: PgPool) {
    let cfg = test_config(2);
    allocation::add_bed(&pool, &cfg, direct_add("Alice")).await.unwrap();
    allocation::add_bed(&pool, &cfg, direct_add("Bob")).await.unwrap();

    let result = allocation::add_bed(&pool, &cfg, direct_add("Jane")).await;
    assert!(matches!(result, Err(WorkflowError::CapacityExceeded)));
    assert_eq!(occupied_beds(&pool).await, vec![1, 2]);
}

#[sqlx::test]
async fn remove_bed_restores_occupied_set(pool: PgPool) {
    let cfg = test_config(5);
    allocation::add_bed(&pool, &cfg, direct_add("Alice")).await.unwrap();
    let before = occupied_beds(&pool).await;

    let created = allocation::add_bed(&pool, &cfg, direct_add("Bob")).await.unwrap();
    allocation::remove_bed(&pool, created.bed_no).await.unwrap();

    assert_eq!(occupied_beds(&pool).await, before);
}

#[sqlx::test]
async fn remove_missing_bed_is_not_found(pool: PgPool) {
    let result = allocation::remove_bed(&pool, 1).await;
    assert!(matches!(result, Err(WorkflowError::NotFound)));
    assert_eq!(occupied_beds(&pool).await, Vec::<i64>::new());
}

#[sqlx::test]
async fn submit_creates_pending_application(pool: PgPool) {
    let student = insert_student(&pool, "amara").await;

    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    assert_eq!(app.status, STATUS_PENDING);
    assert_eq!(app.user_id, student.id);
    // Contact email falls back to the account email.
    assert_eq!(app.email.as_deref(), Some(student.email.as_str()));
}

#[sqlx::test]
async fn submit_rejects_second_pending_application(pool: PgPool) {
    let student = insert_student(&pool, "amara").await;

    allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    let result =
        allocation::submit_application(&pool, &student, application_for("Amara O.")).await;

    assert!(matches!(result, Err(WorkflowError::Validation(_))));
    let apps = application::find_by_user_id(&pool, student.id).await.unwrap();
    assert_eq!(apps.len(), 1);
}

#[sqlx::test]
async fn submit_rejects_user_who_holds_a_bed(pool: PgPool) {
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;

    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    let result =
        allocation::submit_application(&pool, &student, application_for("Amara O.")).await;
    assert!(matches!(result, Err(WorkflowError::Validation(_))));
}

#[sqlx::test]
async fn approve_links_bed_and_application(pool: PgPool) {
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;

    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    let approved = allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    assert_eq!(approved.status, STATUS_APPROVED);
    assert_eq!(approved.bed_no, Some(1));
    assert!(approved.reviewed_date.is_some());

    let assigned = bed::find_by_user_id(&pool, student.id).await.unwrap().unwrap();
    assert_eq!(assigned.bed_no, 1);
    assert_eq!(assigned.name, "Amara O.");
    assert_eq!(assigned.payment_status, PAYMENT_PENDING);
}

#[sqlx::test]
async fn approve_is_idempotent_on_retry(pool: PgPool) {
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;

    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    let retry = allocation::approve_application(&pool, &cfg, app.id).await;
    assert!(matches!(retry, Err(WorkflowError::AlreadyProcessed)));
    // Still exactly one ledger row.
    assert_eq!(occupied_beds(&pool).await, vec![1]);
}

#[sqlx::test]
async fn approve_missing_application_is_not_found(pool: PgPool) {
    let cfg = test_config(5);
    let result = allocation::approve_application(&pool, &cfg, 4242).await;
    assert!(matches!(result, Err(WorkflowError::NotFound)));
}

#[sqlx::test]
async fn approve_at_capacity_leaves_application_pending(pool: PgPool) {
    // Single-bed hostel: A is approved onto the only bed, then B's approval
    // must fail without consuming B's application.
    let cfg = test_config(1);
    let a = insert_student(&pool, "usera").await;
    let b = insert_student(&pool, "userb").await;

    let app_a = allocation::submit_application(&pool, &a, application_for("User A"))
        .await
        .unwrap();
    let approved = allocation::approve_application(&pool, &cfg, app_a.id).await.unwrap();
    assert_eq!(approved.bed_no, Some(1));

    let app_b = allocation::submit_application(&pool, &b, application_for("User B"))
        .await
        .unwrap();
    let result = allocation::approve_application(&pool, &cfg, app_b.id).await;
    assert!(matches!(result, Err(WorkflowError::CapacityExceeded)));

    let b_after = application::find_by_id(&pool, app_b.id).await.unwrap().unwrap();
    assert_eq!(b_after.status, STATUS_PENDING);
    assert_eq!(b_after.bed_no, None);
    assert_eq!(occupied_beds(&pool).await, vec![1]);
}

#[sqlx::test]
async fn reject_sets_terminal_status_and_notes(pool: PgPool) {
    let student = insert_student(&pool, "amara").await;
    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();

    let rejected = allocation::reject_application(&pool, app.id, "No documents").await.unwrap();
    assert_eq!(rejected.status, STATUS_REJECTED);
    assert_eq!(rejected.notes.as_deref(), Some("No documents"));
    assert!(rejected.reviewed_date.is_some());
    assert_eq!(occupied_beds(&pool).await, Vec::<i64>::new());
}

#[sqlx::test]
async fn reject_non_pending_never_mutates(pool: PgPool) {
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;
    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    let result = allocation::reject_application(&pool, app.id, "too late").await;
    assert!(matches!(result, Err(WorkflowError::AlreadyProcessed)));

    let after = application::find_by_id(&pool, app.id).await.unwrap().unwrap();
    assert_eq!(after.status, STATUS_APPROVED);
    assert_eq!(after.notes, None);
}

#[sqlx::test]
async fn reject_missing_application_is_not_found(pool: PgPool) {
    let result = allocation::reject_application(&pool, 4242, "").await;
    assert!(matches!(result, Err(WorkflowError::NotFound)));
}

#[sqlx::test]
async fn removal_keeps_approved_application_as_history(pool: PgPool) {
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;
    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    let approved = allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    allocation::remove_bed(&pool, approved.bed_no.unwrap()).await.unwrap();

    // The application remains an untouched historical record.
    let after = application::find_by_id(&pool, app.id).await.unwrap().unwrap();
    assert_eq!(after.status, STATUS_APPROVED);
    assert_eq!(after.bed_no, approved.bed_no);
}

#[sqlx::test]
async fn direct_add_for_bed_holder_is_refused(pool: PgPool) {
    // The partial unique index on user_id backstops the one-bed-per-user
    // invariant even when the pre-check is bypassed.
    let cfg = test_config(5);
    let student = insert_student(&pool, "amara").await;
    let app = allocation::submit_application(&pool, &student, application_for("Amara O."))
        .await
        .unwrap();
    allocation::approve_application(&pool, &cfg, app.id).await.unwrap();

    let duplicate = NewBed {
        name: "Amara O.".to_string(),
        student_id: None,
        contact: None,
        email: None,
        user_id: Some(student.id),
    };
    let result = allocation::add_bed(&pool, &cfg, duplicate).await;
    assert!(matches!(result, Err(WorkflowError::Validation(_))));
    assert_eq!(occupied_beds(&pool).await, vec![1]);
}

#[sqlx::test]
async fn payment_status_update(pool: PgPool) {
    let cfg = test_config(5);
    let created = allocation::add_bed(&pool, &cfg, direct_add("Alice")).await.unwrap();

    allocation::set_payment_status(&pool, created.bed_no, "Paid").await.unwrap();
    let after = bed::find_by_bed_no(&pool, created.bed_no).await.unwrap().unwrap();
    assert_eq!(after.payment_status, "Paid");

    let invalid = allocation::set_payment_status(&pool, created.bed_no, "Overdue").await;
    assert!(matches!(invalid, Err(WorkflowError::Validation(_))));

    let missing = allocation::set_payment_status(&pool, 99, "Paid").await;
    assert!(matches!(missing, Err(WorkflowError::NotFound)));
}
