use sqlx::PgPool;

use super::types::{Application, ApplicationWithUser};
use crate::errors::AppError;

const SELECT_APPLICATION: &str = "SELECT id, user_id, student_name, student_id, \
     contact, email, status, applied_date, reviewed_date, bed_no, notes \
     FROM applications";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Application>, AppError> {
    let app = sqlx::query_as::<_, Application>(&format!("{SELECT_APPLICATION} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(app)
}

/// A user's applications, newest first.
pub async fn find_by_user_id(pool: &PgPool, user_id: i64) -> Result<Vec<Application>, AppError> {
    let apps = sqlx::query_as::<_, Application>(&format!(
        "{SELECT_APPLICATION} WHERE user_id = $1 ORDER BY applied_date DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

/// All applications joined with the owning user, newest first, for the admin
/// review list.
pub async fn find_all_with_users(pool: &PgPool) -> Result<Vec<ApplicationWithUser>, AppError> {
    let apps = sqlx::query_as::<_, ApplicationWithUser>(
        "SELECT a.id, a.user_id, u.username, u.email AS user_email, \
                a.student_name, a.student_id, a.contact, a.email, a.status, \
                a.applied_date, a.reviewed_date, a.bed_no, a.notes \
         FROM applications a \
         JOIN users u ON a.user_id = u.id \
         ORDER BY a.applied_date DESC, a.id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
