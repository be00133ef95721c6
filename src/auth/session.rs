use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::ROLE_ADMIN;

/// The acting user's identity, as established at login. Workflow calls
/// trust this without re-verifying credentials.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

/// Read the full identity out of the session. All four keys are written
/// together at login, so a missing key means a stale or tampered cookie.
pub fn current_user(session: &Session) -> Result<CurrentUser, AppError> {
    let get = |key: &str| -> Result<String, AppError> {
        session
            .get::<String>(key)
            .unwrap_or(None)
            .ok_or_else(|| AppError::Session(format!("No {key} in session")))
    };
    let id = get_user_id(session)
        .ok_or_else(|| AppError::Session("No user_id in session".to_string()))?;
    Ok(CurrentUser {
        id,
        username: get("username")?,
        email: get("email")?,
        role: get("role")?,
    })
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

/// Explicit capability check at the start of each admin operation.
/// Returns the acting user on success so callers don't read the session twice.
pub fn require_admin(session: &Session) -> Result<CurrentUser, AppError> {
    let user = current_user(session)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(AppError::PermissionDenied("admin".to_string()))
    }
}
