use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use hms::auth::{self, rate_limit::RateLimiter};
use hms::config::Config;
use hms::notifier::Notifier;
use hms::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = db::init_pool(&config.database_url).await;
    db::run_migrations(&pool).await;

    let notifier = Notifier::from_config(config.mail.as_ref(), config.hostel_fee);
    let rate_limiter = RateLimiter::new();

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+) — generating random key", val.len());
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let bind_addr = config.bind_addr.clone();
    log::info!("Starting server at http://{bind_addr} ({} beds)", config.total_beds);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            // Public routes
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            .route("/register", web::get().to(handlers::auth_handlers::register_page))
            .route("/register", web::post().to(handlers::auth_handlers::register_submit))
            // Root redirect
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/dashboard", web::get().to(handlers::dashboard::index))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Bed ledger
                    .route("/beds", web::get().to(handlers::bed_handlers::list))
                    .route("/beds/add", web::get().to(handlers::bed_handlers::add_form))
                    .route("/beds/add", web::post().to(handlers::bed_handlers::add_submit))
                    .route("/beds/{bed_no}/remove", web::post().to(handlers::bed_handlers::remove))
                    .route("/beds/{bed_no}/payment", web::post().to(handlers::bed_handlers::update_payment))
                    .route("/search", web::get().to(handlers::bed_handlers::search))
                    // Student application flow
                    .route("/apply", web::get().to(handlers::application_handlers::apply_form))
                    .route("/apply", web::post().to(handlers::application_handlers::apply_submit))
                    .route("/my-applications", web::get().to(handlers::application_handlers::my_applications))
                    .route("/account", web::get().to(handlers::account_handlers::show))
                    // Admin review queue
                    .route("/admin/applications", web::get().to(handlers::application_handlers::list_all))
                    .route("/admin/applications/{id}/approve", web::post().to(handlers::application_handlers::approve))
                    .route("/admin/applications/{id}/reject", web::post().to(handlers::application_handlers::reject))
                    // JSON API
                    .route("/api/v1/beds/availability", web::get().to(handlers::api_v1::beds::availability))
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
