use actix_session::Session;
use actix_web::{HttpResponse, web};
use std::collections::HashMap;
use sqlx::PgPool;

use crate::allocation::{self, WorkflowError};
use crate::auth::csrf;
use crate::auth::session::require_admin;
use crate::auth::validate;
use crate::config::Config;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::bed::{self, BedForm, NewBed, PaymentForm};
use crate::notifier::Notifier;
use crate::templates_structs::{AddBedTemplate, BedsTemplate, PageContext, SearchTemplate};

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// Trim a form field, mapping empty to None.
fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// GET /beds: all allotments, visible to any authenticated user.
pub async fn list(
    pool: web::Data<PgPool>,
    cfg: web::Data<Config>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    let allotments = bed::find_all(&pool).await?;
    let available_beds = cfg.total_beds - allotments.len() as i64;

    render(BedsTemplate {
        ctx,
        allotments,
        total_beds: cfg.total_beds,
        available_beds,
    })
}

/// GET /beds/add
pub async fn add_form(session: Session) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session)?;
    render(AddBedTemplate { ctx, errors: vec![] })
}

/// POST /beds/add: admin direct allocation.
pub async fn add_submit(
    pool: web::Data<PgPool>,
    cfg: web::Data<Config>,
    notifier: web::Data<Notifier>,
    session: Session,
    form: web::Form<BedForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = [
        validate::validate_required(&form.name, "Student name", 100),
        validate::validate_optional(&form.student_id, "Student ID", 50),
        validate::validate_optional(&form.contact, "Contact", 20),
        validate::validate_optional(&form.email, "Email", 254),
    ]
    .into_iter()
    .flatten()
    .collect();

    if let Some(email) = opt(&form.email) {
        if let Some(e) = validate::validate_email(&email) {
            errors.push(e);
        }
    }

    if !errors.is_empty() {
        let ctx = PageContext::build(&session)?;
        return render(AddBedTemplate { ctx, errors });
    }

    let new = NewBed {
        name: form.name.trim().to_string(),
        student_id: opt(&form.student_id),
        contact: opt(&form.contact),
        email: opt(&form.email),
        user_id: None,
    };

    match allocation::add_bed(&pool, &cfg, new).await {
        Ok(created) => {
            if let Some(email) = &created.email {
                notifier.notify_allocation(email, &created.name, created.bed_no);
            }
            log::info!(
                "bed.allocated {}",
                serde_json::json!({ "bed_no": created.bed_no, "direct_add": true })
            );
            let _ = session.insert(
                "flash",
                format!("Bed {} allocated to {} successfully!", created.bed_no, created.name),
            );
            Ok(redirect_to("/beds"))
        }
        Err(WorkflowError::CapacityExceeded) => {
            let ctx = PageContext::build(&session)?;
            render(AddBedTemplate {
                ctx,
                errors: vec!["Sorry! No beds available.".to_string()],
            })
        }
        Err(WorkflowError::Validation(msg)) => {
            let ctx = PageContext::build(&session)?;
            render(AddBedTemplate { ctx, errors: vec![msg] })
        }
        Err(e) => {
            log::error!("Add bed failed: {e}");
            let _ = session.insert("flash", "Error adding bed allotment.");
            Ok(redirect_to("/beds"))
        }
    }
}

/// POST /beds/{bed_no}/remove
pub async fn remove(
    pool: web::Data<PgPool>,
    notifier: web::Data<Notifier>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let bed_no = path.into_inner();
    match allocation::remove_bed(&pool, bed_no).await {
        Ok(removed) => {
            if let Some(email) = &removed.email {
                notifier.notify_removal(email, &removed.name, bed_no);
            }
            log::info!("bed.removed {}", serde_json::json!({ "bed_no": bed_no }));
            let _ = session.insert(
                "flash",
                format!("Bed {bed_no} allotment removed successfully!"),
            );
        }
        Err(WorkflowError::NotFound) => {
            let _ = session.insert("flash", "No allotment found for this bed.");
        }
        Err(e) => {
            log::error!("Remove bed {bed_no} failed: {e}");
            let _ = session.insert("flash", "Error removing bed allotment.");
        }
    }
    Ok(redirect_to("/beds"))
}

/// POST /beds/{bed_no}/payment
pub async fn update_payment(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<PaymentForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let bed_no = path.into_inner();
    match allocation::set_payment_status(&pool, bed_no, form.status.trim()).await {
        Ok(()) => {
            let _ = session.insert("flash", "Payment status updated successfully!");
        }
        Err(WorkflowError::Validation(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(WorkflowError::NotFound) => {
            let _ = session.insert("flash", "No allotment found for this bed.");
        }
        Err(e) => {
            log::error!("Payment update for bed {bed_no} failed: {e}");
            let _ = session.insert("flash", "Error updating payment status.");
        }
    }
    Ok(redirect_to("/beds"))
}

/// GET /search?q=...&type=name|bed|student_id|all
pub async fn search(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    let q = query.get("q").map(|s| s.trim().to_string()).unwrap_or_default();
    let search_type = query
        .get("type")
        .cloned()
        .unwrap_or_else(|| "name".to_string());

    let results = if q.is_empty() {
        vec![]
    } else {
        bed::search(&pool, &q, &search_type).await?
    };

    render(SearchTemplate { ctx, results, query: q, search_type })
}
