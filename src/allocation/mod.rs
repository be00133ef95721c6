//! The bed-allocation and application-approval workflow.
//!
//! Every operation here is one transaction: the ledger lock, the capacity
//! check, and the writes commit together or not at all. The partial unique
//! indexes on `beds.user_id` and `applications(user_id) WHERE Pending` are
//! the authoritative guards; the in-transaction pre-checks only exist to
//! give the user a friendlier message sooner.

use sqlx::{PgPool, Postgres, Transaction};
use std::fmt;

use crate::auth::session::CurrentUser;
use crate::config::Config;
use crate::models::application::{
    Application, NewApplication, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED,
};
use crate::models::bed::{BedAssignment, NewBed, PAYMENT_PAID, PAYMENT_PENDING};

/// Tagged failure surface of the workflow. Handlers translate each variant
/// to a user-facing message; nothing here propagates as an unhandled fault.
#[derive(Debug)]
pub enum WorkflowError {
    /// No free slot in `1..=TOTAL_BEDS`; a domain outcome, not a fault.
    CapacityExceeded,
    /// Stale id: the record was already deleted or never existed.
    NotFound,
    /// Idempotent guard: the application already reached a terminal status.
    AlreadyProcessed,
    /// Rejected before any store access (missing field, bad enum value,
    /// duplicate submission).
    Validation(String),
    /// The store failed; the transaction rolled back and nothing persisted.
    Store(sqlx::Error),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::CapacityExceeded => write!(f, "No beds available"),
            WorkflowError::NotFound => write!(f, "Record not found"),
            WorkflowError::AlreadyProcessed => write!(f, "Application already processed"),
            WorkflowError::Validation(msg) => write!(f, "{msg}"),
            WorkflowError::Store(e) => write!(f, "Store error: {e}"),
        }
    }
}

impl From<sqlx::Error> for WorkflowError {
    fn from(e: sqlx::Error) -> Self {
        WorkflowError::Store(e)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Smallest unoccupied bed number in `1..=total_beds`.
///
/// Pure function over a snapshot of the ledger; callers must hold the
/// ledger lock for the snapshot to stay valid until the insert.
pub fn next_free_bed(occupied: &[i64], total_beds: i64) -> Result<i64, WorkflowError> {
    if occupied.len() as i64 >= total_beds {
        return Err(WorkflowError::CapacityExceeded);
    }
    for n in 1..=total_beds {
        if !occupied.contains(&n) {
            return Ok(n);
        }
    }
    // The count said there was room; the scan disagrees. Treat as full.
    Err(WorkflowError::CapacityExceeded)
}

/// Lock the ledger rows and return the occupied bed numbers. Serializes
/// concurrent allocations for the rest of the transaction.
async fn lock_occupied(tx: &mut Transaction<'_, Postgres>) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT bed_no FROM beds ORDER BY bed_no FOR UPDATE")
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(n,)| n).collect())
}

async fn insert_bed(
    tx: &mut Transaction<'_, Postgres>,
    bed_no: i64,
    new: &NewBed,
) -> Result<BedAssignment, sqlx::Error> {
    sqlx::query_as::<_, BedAssignment>(
        "INSERT INTO beds (bed_no, name, student_id, contact, email, \
                           check_in_date, payment_status, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING bed_no, name, student_id, contact, email, check_in_date, \
                   payment_status, user_id",
    )
    .bind(bed_no)
    .bind(new.name.trim())
    .bind(&new.student_id)
    .bind(&new.contact)
    .bind(&new.email)
    .bind(now_stamp())
    .bind(PAYMENT_PENDING)
    .bind(new.user_id)
    .fetch_one(&mut **tx)
    .await
}

/// Admin direct add: allocate the lowest free bed and create the ledger row.
pub async fn add_bed(
    pool: &PgPool,
    cfg: &Config,
    new: NewBed,
) -> Result<BedAssignment, WorkflowError> {
    if new.name.trim().is_empty() {
        return Err(WorkflowError::Validation("Student name is required".to_string()));
    }

    let mut tx = pool.begin().await?;
    let occupied = lock_occupied(&mut tx).await?;
    let bed_no = next_free_bed(&occupied, cfg.total_beds)?;
    let bed = insert_bed(&mut tx, bed_no, &new).await.map_err(|e| {
        if is_unique_violation(&e) {
            WorkflowError::Validation("This student already holds a bed".to_string())
        } else {
            WorkflowError::Store(e)
        }
    })?;
    tx.commit().await?;
    Ok(bed)
}

/// Student submission: one new Pending application, provided the user holds
/// no bed and has no Pending application already.
pub async fn submit_application(
    pool: &PgPool,
    user: &CurrentUser,
    new: NewApplication,
) -> Result<Application, WorkflowError> {
    if new.student_name.trim().is_empty() {
        return Err(WorkflowError::Validation("Student name is required".to_string()));
    }

    let mut tx = pool.begin().await?;

    let has_bed: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM beds WHERE user_id = $1)")
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;
    if has_bed {
        return Err(WorkflowError::Validation(
            "You already have a bed allocated!".to_string(),
        ));
    }

    let has_pending: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE user_id = $1 AND status = $2)",
    )
    .bind(user.id)
    .bind(STATUS_PENDING)
    .fetch_one(&mut *tx)
    .await?;
    if has_pending {
        return Err(WorkflowError::Validation(
            "You already have a pending application!".to_string(),
        ));
    }

    // Contact email falls back to the account email.
    let email = non_empty(new.email).unwrap_or_else(|| user.email.clone());

    let app = sqlx::query_as::<_, Application>(
        "INSERT INTO applications (user_id, student_name, student_id, contact, \
                                   email, status, applied_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, student_name, student_id, contact, email, \
                   status, applied_date, reviewed_date, bed_no, notes",
    )
    .bind(user.id)
    .bind(new.student_name.trim())
    .bind(&new.student_id)
    .bind(&new.contact)
    .bind(&email)
    .bind(STATUS_PENDING)
    .bind(now_stamp())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            WorkflowError::Validation("You already have a pending application!".to_string())
        } else {
            WorkflowError::Store(e)
        }
    })?;

    tx.commit().await?;
    Ok(app)
}

/// Lock one application row for review. NotFound for a stale id,
/// AlreadyProcessed once the status is terminal.
async fn lock_pending_application(
    tx: &mut Transaction<'_, Postgres>,
    application_id: i64,
) -> Result<Application, WorkflowError> {
    let app = sqlx::query_as::<_, Application>(
        "SELECT id, user_id, student_name, student_id, contact, email, status, \
                applied_date, reviewed_date, bed_no, notes \
         FROM applications WHERE id = $1 FOR UPDATE",
    )
    .bind(application_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(WorkflowError::NotFound)?;

    if !app.is_pending() {
        return Err(WorkflowError::AlreadyProcessed);
    }
    Ok(app)
}

/// Approve a Pending application: allocate a bed for the applicant and mark
/// the application Approved, as one atomic unit. On CapacityExceeded the
/// transaction rolls back and the application stays Pending for a later
/// retry.
pub async fn approve_application(
    pool: &PgPool,
    cfg: &Config,
    application_id: i64,
) -> Result<Application, WorkflowError> {
    let mut tx = pool.begin().await?;
    let app = lock_pending_application(&mut tx, application_id).await?;

    let occupied = lock_occupied(&mut tx).await?;
    let bed_no = next_free_bed(&occupied, cfg.total_beds)?;

    let new_bed = NewBed {
        name: app.student_name.clone(),
        student_id: app.student_id.clone(),
        contact: app.contact.clone(),
        email: app.email.clone(),
        user_id: Some(app.user_id),
    };
    insert_bed(&mut tx, bed_no, &new_bed).await.map_err(|e| {
        if is_unique_violation(&e) {
            WorkflowError::Validation("Applicant already holds a bed".to_string())
        } else {
            WorkflowError::Store(e)
        }
    })?;

    let updated = sqlx::query_as::<_, Application>(
        "UPDATE applications \
         SET status = $2, reviewed_date = $3, bed_no = $4 \
         WHERE id = $1 \
         RETURNING id, user_id, student_name, student_id, contact, email, \
                   status, applied_date, reviewed_date, bed_no, notes",
    )
    .bind(application_id)
    .bind(STATUS_APPROVED)
    .bind(now_stamp())
    .bind(bed_no)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Reject a Pending application with review notes. No ledger interaction.
pub async fn reject_application(
    pool: &PgPool,
    application_id: i64,
    notes: &str,
) -> Result<Application, WorkflowError> {
    let mut tx = pool.begin().await?;
    lock_pending_application(&mut tx, application_id).await?;

    let updated = sqlx::query_as::<_, Application>(
        "UPDATE applications \
         SET status = $2, reviewed_date = $3, notes = $4 \
         WHERE id = $1 \
         RETURNING id, user_id, student_name, student_id, contact, email, \
                   status, applied_date, reviewed_date, bed_no, notes",
    )
    .bind(application_id)
    .bind(STATUS_REJECTED)
    .bind(now_stamp())
    .bind(notes.trim())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Remove an allotment. Returns the deleted row so the caller can notify
/// the former occupant. The originating application keeps its Approved
/// status and historical bed number.
pub async fn remove_bed(pool: &PgPool, bed_no: i64) -> Result<BedAssignment, WorkflowError> {
    let removed = sqlx::query_as::<_, BedAssignment>(
        "DELETE FROM beds WHERE bed_no = $1 \
         RETURNING bed_no, name, student_id, contact, email, check_in_date, \
                   payment_status, user_id",
    )
    .bind(bed_no)
    .fetch_optional(pool)
    .await?
    .ok_or(WorkflowError::NotFound)?;
    Ok(removed)
}

/// Update the payment status for an allotment. Invalid values are rejected
/// before any store access.
pub async fn set_payment_status(
    pool: &PgPool,
    bed_no: i64,
    status: &str,
) -> Result<(), WorkflowError> {
    if status != PAYMENT_PAID && status != PAYMENT_PENDING {
        return Err(WorkflowError::Validation("Invalid payment status".to_string()));
    }

    let result = sqlx::query("UPDATE beds SET payment_status = $2 WHERE bed_no = $1")
        .bind(bed_no)
        .bind(status)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(WorkflowError::NotFound);
    }
    Ok(())
}
