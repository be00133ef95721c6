use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::session::current_user;
use crate::errors::{AppError, render};
use crate::models::{bed, user};
use crate::templates_structs::{AccountTemplate, PageContext};

/// GET /account: own profile plus current bed allocation.
pub async fn show(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    let acting = current_user(&session)?;

    let display = user::find_display_by_id(&pool, acting.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let bed = bed::find_by_user_id(&pool, acting.id).await?;

    render(AccountTemplate { ctx, user: display, bed })
}
