use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::{csrf, password, validate};
use crate::errors::{AppError, render};
use crate::models::user::{self, NewUser};
use crate::templates_structs::{LoginTemplate, RegisterTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    // If already logged in, redirect to dashboard
    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(redirect_to("/dashboard"));
    }

    let csrf_token = csrf::get_or_create_token(&session);
    render(LoginTemplate { error: None, csrf_token })
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        let csrf_token = csrf::get_or_create_token(&session);
        return render(LoginTemplate {
            error: Some("Too many failed login attempts. Please try again later.".to_string()),
            csrf_token,
        });
    }

    let found = user::find_by_username(&pool, form.username.trim()).await?;

    match found {
        Some(u) if password::verify_password(&form.password, &u.password).unwrap_or(false) => {
            limiter.clear(ip);

            let _ = session.insert("user_id", u.id);
            let _ = session.insert("username", &u.username);
            let _ = session.insert("email", &u.email);
            let _ = session.insert("role", &u.role);
            let _ = session.insert("flash", format!("Welcome back, {}!", u.username));
            Ok(redirect_to("/dashboard"))
        }
        _ => {
            limiter.record_failure(ip);
            let csrf_token = csrf::get_or_create_token(&session);
            render(LoginTemplate {
                error: Some("Invalid username or password".to_string()),
                csrf_token,
            })
        }
    }
}

pub async fn register_page(session: Session) -> Result<HttpResponse, AppError> {
    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(redirect_to("/dashboard"));
    }

    let csrf_token = csrf::get_or_create_token(&session);
    render(RegisterTemplate { errors: vec![], csrf_token })
}

pub async fn register_submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(redirect_to("/dashboard"));
    }

    let mut errors: Vec<String> = [
        validate::validate_username(&form.username),
        validate::validate_email(&form.email),
        validate::validate_password(&form.password),
    ]
    .into_iter()
    .flatten()
    .collect();

    if form.password != form.confirm_password {
        errors.push("Passwords do not match".to_string());
    }

    if errors.is_empty()
        && user::username_or_email_exists(&pool, form.username.trim(), form.email.trim()).await?
    {
        errors.push("Username or email already exists".to_string());
    }

    if !errors.is_empty() {
        let csrf_token = csrf::get_or_create_token(&session);
        return render(RegisterTemplate { errors, csrf_token });
    }

    let password_hash = password::hash_password(&form.password).map_err(AppError::Hash)?;
    let new_user = NewUser {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: password_hash,
    };

    match user::create(&pool, &new_user).await {
        Ok(created) => {
            log::info!("Registered user {} with role {}", created.username, created.role);
            let _ = session.insert("flash", "Registration successful! Please log in.");
            Ok(redirect_to("/login"))
        }
        // Concurrent registration with the same name slipped past the
        // pre-check; the unique constraint is the guard.
        Err(AppError::Db(e))
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) =>
        {
            let csrf_token = csrf::get_or_create_token(&session);
            render(RegisterTemplate {
                errors: vec!["Username or email already exists".to_string()],
                csrf_token,
            })
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect_to("/login"))
}
