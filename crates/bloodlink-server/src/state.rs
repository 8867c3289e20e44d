use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info};

use bloodlink_core::models::{AdminRole, NewAdmin};
use bloodlink_core::Database;

use crate::{config::Config, notify::Mailer};

/// Shared application state: configuration, the database behind a mutex,
/// and the mail transport. One instance per process, passed to every
/// handler through axum state.
pub struct AppState {
    pub config: Config,
    pub db: Mutex<Database>,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        let db = Database::open(&config.database_path).expect("Failed to open database");
        ensure_default_admin(&db, &config);
        let mailer = Mailer::from_config(&config);

        Arc::new(Self {
            config,
            db: Mutex::new(db),
            mailer,
        })
    }

    /// Lock the database for a batch of statements. Never hold the guard
    /// across an await point.
    pub fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().expect("database mutex poisoned")
    }
}

/// Create the bootstrap admin account on a fresh database so the dashboard
/// is reachable before any other admin exists.
fn ensure_default_admin(db: &Database, config: &Config) {
    match db.count_admins() {
        Ok(0) => {
            let password_hash = bcrypt::hash(&config.default_admin_password, bcrypt::DEFAULT_COST)
                .expect("Failed to hash default admin password");
            let admin = NewAdmin {
                username: config.default_admin_username.clone(),
                password_hash,
                email: None,
                role: AdminRole::SuperAdmin,
            };
            match db.insert_admin(&admin) {
                Ok(_) => info!("Created default admin account: {}", admin.username),
                Err(e) => error!("Failed to create default admin: {e}"),
            }
        }
        Ok(_) => {}
        Err(e) => error!("Failed to check admin accounts: {e}"),
    }
}
