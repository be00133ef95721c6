//! Identity store tests: registration bootstrap, duplicate detection, and
//! password hashing.

mod common;

use sqlx::PgPool;

use common::*;
use hms::auth::password;
use hms::models::user::{self, NewUser, ROLE_ADMIN, ROLE_USER};

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: "x".to_string(),
    }
}

#[sqlx::test]
async fn first_registrant_becomes_admin(pool: PgPool) {
    let first = user::create(&pool, &new_user("founder", "founder@example.com"))
        .await
        .unwrap();
    assert_eq!(first.role, ROLE_ADMIN);
    assert!(first.is_admin());

    let second = user::create(&pool, &new_user(TEST_USERNAME, TEST_EMAIL))
        .await
        .unwrap();
    assert_eq!(second.role, ROLE_USER);
    assert!(!second.is_admin());

    assert_eq!(user::count(&pool).await.unwrap(), 2);
}

#[sqlx::test]
async fn duplicate_username_is_rejected(pool: PgPool) {
    user::create(&pool, &new_user(TEST_USERNAME, TEST_EMAIL))
        .await
        .unwrap();

    let result = user::create(&pool, &new_user(TEST_USERNAME, "other@example.com")).await;
    assert!(result.is_err(), "Should fail on duplicate username");

    let result = user::create(&pool, &new_user("otheruser", TEST_EMAIL)).await;
    assert!(result.is_err(), "Should fail on duplicate email");

    assert_eq!(user::count(&pool).await.unwrap(), 1);
}

#[sqlx::test]
async fn existence_check_matches_username_or_email(pool: PgPool) {
    user::create(&pool, &new_user(TEST_USERNAME, TEST_EMAIL))
        .await
        .unwrap();

    assert!(user::username_or_email_exists(&pool, TEST_USERNAME, "new@example.com")
        .await
        .unwrap());
    assert!(user::username_or_email_exists(&pool, "newuser", TEST_EMAIL)
        .await
        .unwrap());
    assert!(!user::username_or_email_exists(&pool, "newuser", "new@example.com")
        .await
        .unwrap());
}

#[sqlx::test]
async fn find_by_username_returns_hash_for_auth(pool: PgPool) {
    let hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    user::create(
        &pool,
        &NewUser {
            username: TEST_USERNAME.to_string(),
            email: TEST_EMAIL.to_string(),
            password: hash,
        },
    )
    .await
    .unwrap();

    let found = user::find_by_username(&pool, TEST_USERNAME)
        .await
        .unwrap()
        .expect("User not found");
    assert!(password::verify_password(TEST_PASSWORD, &found.password).unwrap());
    assert!(!password::verify_password("wrongpassword", &found.password).unwrap());

    assert!(user::find_by_username(&pool, "nobody").await.unwrap().is_none());
}

#[sqlx::test]
async fn display_struct_carries_no_password(pool: PgPool) {
    let created = user::create(&pool, &new_user(TEST_USERNAME, TEST_EMAIL))
        .await
        .unwrap();

    let display = user::find_display_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("User not found");
    assert_eq!(display.username, TEST_USERNAME);
    assert_eq!(display.email, TEST_EMAIL);
    assert_eq!(display.role, ROLE_ADMIN);
}

#[test]
fn hash_password_randomness() {
    let hash1 = password::hash_password(TEST_PASSWORD).expect("Failed to hash first password");
    let hash2 = password::hash_password(TEST_PASSWORD).expect("Failed to hash second password");

    // Same password should produce different hashes (different salts)
    assert_ne!(hash1, hash2);
}
