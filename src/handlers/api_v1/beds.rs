use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::application::{self, STATUS_PENDING};
use crate::models::bed;
use crate::templates_structs::AvailabilityResponse;

/// GET /api/v1/beds/availability: occupancy snapshot as JSON.
pub async fn availability(
    pool: web::Data<PgPool>,
    cfg: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let reserved_beds = bed::count(&pool).await?;
    let pending_applications = application::count_by_status(&pool, STATUS_PENDING).await?;

    let response = AvailabilityResponse {
        total_beds: cfg.total_beds,
        reserved_beds,
        available_beds: cfg.total_beds - reserved_beds,
        pending_applications,
    };
    Ok(HttpResponse::Ok().json(response))
}
