use sqlx::PgPool;

use super::types::{NewUser, ROLE_ADMIN, ROLE_USER, User, UserDisplay};
use crate::errors::AppError;

const SELECT_USER: &str =
    "SELECT id, username, email, password, role, created_at FROM users";

/// Find user by username for authentication. Returns internal User with
/// password hash.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_display_by_id(pool: &PgPool, id: i64) -> Result<Option<UserDisplay>, AppError> {
    let user = sqlx::query_as::<_, UserDisplay>(
        "SELECT id, username, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Check whether a username or email is already taken.
pub async fn username_or_email_exists(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Create a new user. The first registrant becomes admin; the count and the
/// insert run in one transaction so two racing first registrations cannot
/// both be promoted.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<User, AppError> {
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    let role = if existing == 0 { ROLE_ADMIN } else { ROLE_USER };

    let created = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password, role, created_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, username, email, password, role, created_at",
    )
    .bind(new.username.trim())
    .bind(new.email.trim())
    .bind(&new.password)
    .bind(role)
    .bind(&created)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(user)
}
