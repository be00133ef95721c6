// Template context structures for Askama templates, organized by domain.
// All types are re-exported: `use hms::templates_structs::*`

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{current_user, take_flash};
use crate::errors::AppError;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.is_admin`, etc.
pub struct PageContext {
    pub username: String,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Result<Self, AppError> {
        let user = current_user(session)?;
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        let is_admin = user.is_admin();
        Ok(Self {
            username: user.username,
            is_admin,
            flash,
            csrf_token,
        })
    }
}

mod account;
mod api;
mod application;
mod bed;
mod common;
mod dashboard;

pub use account::*;
pub use api::*;
pub use application::*;
pub use bed::*;
pub use common::*;
pub use dashboard::*;
