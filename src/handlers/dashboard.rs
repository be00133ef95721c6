use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::config::Config;
use crate::errors::{AppError, render};
use crate::models::application::{self, STATUS_PENDING};
use crate::models::bed::{self, PAYMENT_PAID, PAYMENT_PENDING};
use crate::templates_structs::{
    AdminDashboardTemplate, PageContext, StudentDashboardTemplate,
};

/// Main dashboard: admins get occupancy statistics, students get their own
/// bed and application history.
pub async fn index(
    pool: web::Data<PgPool>,
    cfg: web::Data<Config>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    if ctx.is_admin {
        admin_dashboard(&pool, &cfg, ctx).await
    } else {
        student_dashboard(&pool, &session, ctx).await
    }
}

async fn admin_dashboard(
    pool: &PgPool,
    cfg: &Config,
    ctx: PageContext,
) -> Result<HttpResponse, AppError> {
    let total_beds = cfg.total_beds;
    let reserved_beds = bed::count(pool).await?;
    let available_beds = total_beds - reserved_beds;
    let occupancy_rate = if total_beds > 0 {
        format!("{:.1}", reserved_beds as f64 / total_beds as f64 * 100.0)
    } else {
        "0.0".to_string()
    };

    let paid_count = bed::count_by_payment_status(pool, PAYMENT_PAID).await?;
    let pending_count = bed::count_by_payment_status(pool, PAYMENT_PENDING).await?;
    let pending_applications = application::count_by_status(pool, STATUS_PENDING).await?;
    let recent_allotments = bed::find_recent(pool, 10).await?;

    render(AdminDashboardTemplate {
        ctx,
        total_beds,
        reserved_beds,
        available_beds,
        occupancy_rate,
        paid_count,
        pending_count,
        pending_applications,
        recent_allotments,
    })
}

async fn student_dashboard(
    pool: &PgPool,
    session: &Session,
    ctx: PageContext,
) -> Result<HttpResponse, AppError> {
    let user = crate::auth::session::current_user(session)?;
    let bed = bed::find_by_user_id(pool, user.id).await?;
    let applications = application::find_by_user_id(pool, user.id).await?;

    render(StudentDashboardTemplate { ctx, bed, applications })
}
