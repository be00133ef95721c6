pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Internal user struct for authentication — includes password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Safe version for templates — no password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDisplay {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// New user data for registration. The password is already hashed.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}
