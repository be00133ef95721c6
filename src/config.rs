use std::env;

/// Immutable application configuration, loaded once at startup and passed
/// explicitly to the handlers and workflow calls that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Maximum number of simultaneously assignable beds.
    pub total_beds: i64,
    /// Fee quoted in allocation notification mails, in rupees.
    pub hostel_fee: i64,
    pub mail: Option<MailConfig>,
}

/// SMTP settings. Absent entirely when mail is not configured; a valid
/// disabled state, not an error.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: String,
    pub password: String,
    pub sender: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment. `DATABASE_URL` is required;
    /// everything else has a default. Mail is enabled only when
    /// `MAIL_USERNAME` is set and non-empty.
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8080");
        let total_beds = env_parse("TOTAL_BEDS", 20);
        let hostel_fee = env_parse("HOSTEL_FEE", 5000);

        let mail = match env::var("MAIL_USERNAME") {
            Ok(username) if !username.is_empty() => Some(MailConfig {
                server: env_or("MAIL_SERVER", "smtp.gmail.com"),
                port: env_parse("MAIL_PORT", 587),
                use_tls: env_or("MAIL_USE_TLS", "true").to_lowercase() == "true",
                password: env_or("MAIL_PASSWORD", ""),
                sender: env_or("MAIL_DEFAULT_SENDER", "noreply@hostel.com"),
                username,
            }),
            _ => None,
        };

        Self { database_url, bind_addr, total_beds, hostel_fee, mail }
    }
}
