use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::allocation::{self, WorkflowError};
use crate::auth::csrf;
use crate::auth::session::{current_user, require_admin};
use crate::auth::validate;
use crate::config::Config;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::application::{self, ApplyForm, NewApplication, RejectForm};
use crate::notifier::Notifier;
use crate::templates_structs::{
    AdminApplicationsTemplate, ApplyTemplate, MyApplicationsTemplate, PageContext,
};

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// GET /apply
pub async fn apply_form(session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    render(ApplyTemplate { ctx, errors: vec![] })
}

/// POST /apply: student bed application.
pub async fn apply_submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<ApplyForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user = current_user(&session)?;

    let errors: Vec<String> = [
        validate::validate_required(&form.student_name, "Student name", 100),
        validate::validate_optional(&form.student_id, "Student ID", 50),
        validate::validate_optional(&form.contact, "Contact", 20),
        validate::validate_optional(&form.email, "Email", 254),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !errors.is_empty() {
        let ctx = PageContext::build(&session)?;
        return render(ApplyTemplate { ctx, errors });
    }

    let new = NewApplication {
        student_name: form.student_name.trim().to_string(),
        student_id: opt(&form.student_id),
        contact: opt(&form.contact),
        email: opt(&form.email),
    };

    match allocation::submit_application(&pool, &user, new).await {
        Ok(_) => {
            let _ = session.insert(
                "flash",
                "Application submitted successfully! Admin will review it soon.",
            );
        }
        // Duplicate bed or duplicate pending application. Informational,
        // not an error.
        Err(WorkflowError::Validation(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(e) => {
            log::error!("Application submit for user {} failed: {e}", user.id);
            let _ = session.insert("flash", "Error submitting application.");
        }
    }
    Ok(redirect_to("/dashboard"))
}

/// GET /my-applications
pub async fn my_applications(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    let user = current_user(&session)?;
    let applications = application::find_by_user_id(&pool, user.id).await?;
    render(MyApplicationsTemplate { ctx, applications })
}

/// GET /admin/applications: review queue, newest first.
pub async fn list_all(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session)?;
    let applications = application::find_all_with_users(&pool).await?;
    render(AdminApplicationsTemplate { ctx, applications })
}

/// POST /admin/applications/{id}/approve
pub async fn approve(
    pool: web::Data<PgPool>,
    cfg: web::Data<Config>,
    notifier: web::Data<Notifier>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let application_id = path.into_inner();
    match allocation::approve_application(&pool, &cfg, application_id).await {
        Ok(approved) => {
            if let (Some(email), Some(bed_no)) = (&approved.email, approved.bed_no) {
                notifier.notify_allocation(email, &approved.student_name, bed_no);
            }
            let bed_no = approved.bed_no.unwrap_or_default();
            log::info!(
                "application.approved {}",
                serde_json::json!({ "application_id": application_id, "bed_no": bed_no })
            );
            let _ = session.insert(
                "flash",
                format!("Application approved! Bed {bed_no} allocated."),
            );
        }
        Err(WorkflowError::NotFound) => {
            let _ = session.insert("flash", "Application not found.");
        }
        Err(WorkflowError::AlreadyProcessed) => {
            let _ = session.insert("flash", "Application already processed.");
        }
        Err(WorkflowError::CapacityExceeded) => {
            let _ = session.insert("flash", "Sorry! No beds available.");
        }
        Err(WorkflowError::Validation(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(e) => {
            log::error!("Approve application {application_id} failed: {e}");
            let _ = session.insert("flash", "Error approving application.");
        }
    }
    Ok(redirect_to("/admin/applications"))
}

/// POST /admin/applications/{id}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<RejectForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let application_id = path.into_inner();
    match allocation::reject_application(&pool, application_id, &form.notes).await {
        Ok(_) => {
            log::info!(
                "application.rejected {}",
                serde_json::json!({ "application_id": application_id })
            );
            let _ = session.insert("flash", "Application rejected.");
        }
        Err(WorkflowError::NotFound) | Err(WorkflowError::AlreadyProcessed) => {
            let _ = session.insert("flash", "Application not found or already processed.");
        }
        Err(e) => {
            log::error!("Reject application {application_id} failed: {e}");
            let _ = session.insert("flash", "Error rejecting application.");
        }
    }
    Ok(redirect_to("/admin/applications"))
}
