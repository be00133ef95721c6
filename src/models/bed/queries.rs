use sqlx::PgPool;

use super::types::BedAssignment;
use crate::errors::AppError;

const SELECT_BED: &str = "SELECT bed_no, name, student_id, contact, email, \
     check_in_date, payment_status, user_id FROM beds";

/// All allotments, ordered by bed number.
pub async fn find_all(pool: &PgPool) -> Result<Vec<BedAssignment>, AppError> {
    let beds = sqlx::query_as::<_, BedAssignment>(&format!("{SELECT_BED} ORDER BY bed_no"))
        .fetch_all(pool)
        .await?;
    Ok(beds)
}

pub async fn find_by_bed_no(pool: &PgPool, bed_no: i64) -> Result<Option<BedAssignment>, AppError> {
    let bed = sqlx::query_as::<_, BedAssignment>(&format!("{SELECT_BED} WHERE bed_no = $1"))
        .bind(bed_no)
        .fetch_optional(pool)
        .await?;
    Ok(bed)
}

/// A user's current assignment, if any. The partial unique index on
/// `user_id` guarantees at most one row.
pub async fn find_by_user_id(pool: &PgPool, user_id: i64) -> Result<Option<BedAssignment>, AppError> {
    let bed = sqlx::query_as::<_, BedAssignment>(&format!("{SELECT_BED} WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(bed)
}

/// Most recent allotments by check-in date, for the admin dashboard.
pub async fn find_recent(pool: &PgPool, limit: i64) -> Result<Vec<BedAssignment>, AppError> {
    let beds = sqlx::query_as::<_, BedAssignment>(&format!(
        "{SELECT_BED} ORDER BY check_in_date DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(beds)
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM beds")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_payment_status(pool: &PgPool, status: &str) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM beds WHERE payment_status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Search allotments by name (substring), bed number (exact), student id
/// (substring), or any of the three.
pub async fn search(
    pool: &PgPool,
    query: &str,
    search_type: &str,
) -> Result<Vec<BedAssignment>, AppError> {
    let pattern = format!("%{}%", query.trim());
    let beds = match search_type {
        "name" => {
            sqlx::query_as::<_, BedAssignment>(&format!(
                "{SELECT_BED} WHERE name ILIKE $1 ORDER BY name"
            ))
            .bind(&pattern)
            .fetch_all(pool)
            .await?
        }
        "bed" => {
            let bed_no: i64 = match query.trim().parse() {
                Ok(n) => n,
                Err(_) => return Ok(vec![]),
            };
            sqlx::query_as::<_, BedAssignment>(&format!("{SELECT_BED} WHERE bed_no = $1"))
                .bind(bed_no)
                .fetch_all(pool)
                .await?
        }
        "student_id" => {
            sqlx::query_as::<_, BedAssignment>(&format!(
                "{SELECT_BED} WHERE student_id ILIKE $1 ORDER BY name"
            ))
            .bind(&pattern)
            .fetch_all(pool)
            .await?
        }
        _ => {
            let bed_no: i64 = query.trim().parse().unwrap_or(0);
            sqlx::query_as::<_, BedAssignment>(&format!(
                "{SELECT_BED} WHERE name ILIKE $1 OR student_id ILIKE $1 OR bed_no = $2 \
                 ORDER BY bed_no"
            ))
            .bind(&pattern)
            .bind(bed_no)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(beds)
}
