use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Process configuration, loaded once at startup and carried in the shared
/// state. No module-level globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: String,
    pub default_admin_username: String,
    pub default_admin_password: String,
}

impl Config {
    pub fn load() -> Self {
        let config = Self {
            port: try_load("PORT", "3000"),
            database_path: try_load("DATABASE_PATH", "bloodlink.db"),
            jwt_secret: require("JWT_SECRET"),
            jwt_expiry_hours: try_load("JWT_EXPIRY_HOURS", "24"),
            smtp_host: try_load("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: try_load("SMTP_PORT", "587"),
            smtp_user: load_optional("SMTP_USER"),
            smtp_password: load_optional("SMTP_PASSWORD"),
            email_from: try_load("EMAIL_FROM", "BloodLink <noreply@bloodlink.example>"),
            default_admin_username: try_load("DEFAULT_ADMIN_USERNAME", "admin"),
            default_admin_password: try_load("DEFAULT_ADMIN_PASSWORD", "Admin@12345"),
        };

        if config.jwt_secret.len() < 32 {
            warn!("JWT_SECRET should be at least 32 characters long");
        }
        if config.smtp_user.is_none() || config.smtp_password.is_none() {
            warn!("SMTP credentials not set, email notifications will be skipped");
        }

        config
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn load_optional(key: &str) -> Option<String> {
    var(key).ok().filter(|v| !v.is_empty())
}

fn require(key: &str) -> String {
    var(key)
        .map_err(|_| {
            warn!("Missing required environment variable: {key}");
        })
        .expect("Environment misconfigured!")
}
