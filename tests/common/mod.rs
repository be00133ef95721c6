//! Shared test infrastructure for workflow and model tests.
//!
//! All database tests run under `#[sqlx::test]`, which provisions an
//! isolated Postgres database per test and applies the migrations in
//! `migrations/` before the test body runs.

#![allow(dead_code)]

use sqlx::PgPool;

use hms::auth::session::CurrentUser;
use hms::config::Config;
use hms::models::application::NewApplication;
use hms::models::user::{ROLE_ADMIN, ROLE_USER};

pub const TEST_USERNAME: &str = "testuser";
pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "password123";

/// Config with the given capacity; everything else inert.
pub fn test_config(total_beds: i64) -> Config {
    Config {
        database_url: String::new(),
        bind_addr: String::new(),
        total_beds,
        hostel_fee: 5000,
        mail: None,
    }
}

/// Insert a user directly with a throwaway password hash. Workflow tests
/// don't exercise login, so argon2 hashing is skipped for speed.
pub async fn insert_user(pool: &PgPool, username: &str, email: &str, role: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password, role, created_at) \
         VALUES ($1, $2, 'x', $3, '2026-01-01 00:00:00') RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user")
}

pub async fn insert_admin(pool: &PgPool) -> i64 {
    insert_user(pool, "admin", "admin@example.com", ROLE_ADMIN).await
}

pub async fn insert_student(pool: &PgPool, username: &str) -> CurrentUser {
    let email = format!("{username}@example.com");
    let id = insert_user(pool, username, &email, ROLE_USER).await;
    CurrentUser {
        id,
        username: username.to_string(),
        email,
        role: ROLE_USER.to_string(),
    }
}

/// Application form data with only the name set.
pub fn application_for(name: &str) -> NewApplication {
    NewApplication {
        student_name: name.to_string(),
        student_id: None,
        contact: None,
        email: None,
    }
}

/// The set of occupied bed numbers, ascending.
pub async fn occupied_beds(pool: &PgPool) -> Vec<i64> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT bed_no FROM beds ORDER BY bed_no")
        .fetch_all(pool)
        .await
        .expect("Failed to read occupied beds");
    rows.into_iter().map(|(n,)| n).collect()
}
