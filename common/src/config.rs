//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub admin_emails: Vec<String>,
    pub google_client_id: String,
    pub google_tokeninfo_url: String,
    pub drive_api_base: String,
    pub drive_api_token: String,
    pub smtp_relay: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from_name: String,
    pub slack_webhook_url: String,
    pub app_url: String,
    pub grading_clone_timeout_secs: u64,
    pub grading_eval_timeout_secs: u64,
    pub grading_max_retries: u32,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a development-safe default so test runs and local
    /// tooling work without a populated `.env`; production deployments are
    /// expected to set at least `DATABASE_PATH`, `JWT_SECRET`,
    /// `GOOGLE_CLIENT_ID` and the SMTP credentials.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "review-portal".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/portal.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .expect("PORT must be a valid port number"),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into()),
            jwt_duration_minutes: env::var("JWT_DURATION_MINUTES")
                .unwrap_or("480".into())
                .parse()
                .expect("JWT_DURATION_MINUTES must be a valid integer"),
            admin_emails: env::var("ADMIN_EMAILS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_tokeninfo_url: env::var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".into()),
            drive_api_base: env::var("DRIVE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".into()),
            drive_api_token: env::var("DRIVE_API_TOKEN").unwrap_or_default(),
            smtp_relay: env::var("SMTP_RELAY").unwrap_or_else(|_| "smtp.gmail.com".into()),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            email_from_name: env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Review Portal".into()),
            slack_webhook_url: env::var("SLACK_WEBHOOK_URL").unwrap_or_default(),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
            grading_clone_timeout_secs: env::var("GRADING_CLONE_TIMEOUT_SECS")
                .unwrap_or("60".into())
                .parse()
                .expect("GRADING_CLONE_TIMEOUT_SECS must be a valid integer"),
            grading_eval_timeout_secs: env::var("GRADING_EVAL_TIMEOUT_SECS")
                .unwrap_or("120".into())
                .parse()
                .expect("GRADING_EVAL_TIMEOUT_SECS must be a valid integer"),
            grading_max_retries: env::var("GRADING_MAX_RETRIES")
                .unwrap_or("2".into())
                .parse()
                .expect("GRADING_MAX_RETRIES must be a valid integer"),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_admin_emails(value: Vec<String>) {
        AppConfig::set_field(|cfg| {
            cfg.admin_emails = value.into_iter().map(|e| e.to_lowercase()).collect()
        });
    }

    pub fn set_google_client_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.google_client_id = value.into());
    }

    pub fn set_drive_api_base(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.drive_api_base = value.into());
    }

    pub fn set_drive_api_token(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.drive_api_token = value.into());
    }

    pub fn set_smtp_username(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.smtp_username = value.into());
    }

    pub fn set_slack_webhook_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.slack_webhook_url = value.into());
    }

    pub fn set_app_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.app_url = value.into());
    }

    pub fn set_grading_clone_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.grading_clone_timeout_secs = value);
    }

    pub fn set_grading_eval_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.grading_eval_timeout_secs = value);
    }

    pub fn set_grading_max_retries(value: u32) {
        AppConfig::set_field(|cfg| cfg.grading_max_retries = value);
    }
}

// --- Free-function accessors for frequently read values ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn admin_emails() -> Vec<String> {
    AppConfig::global().admin_emails.clone()
}

/// True when the given address belongs to the configured administrator list.
///
/// Comparison is case-insensitive; the list is normalized to lowercase at load.
pub fn is_admin_email(email: &str) -> bool {
    let email = email.to_lowercase();
    AppConfig::global().admin_emails.iter().any(|e| e == &email)
}

pub fn google_client_id() -> String {
    AppConfig::global().google_client_id.clone()
}

pub fn google_tokeninfo_url() -> String {
    AppConfig::global().google_tokeninfo_url.clone()
}

pub fn drive_api_base() -> String {
    AppConfig::global().drive_api_base.clone()
}

pub fn drive_api_token() -> String {
    AppConfig::global().drive_api_token.clone()
}

pub fn smtp_relay() -> String {
    AppConfig::global().smtp_relay.clone()
}

pub fn smtp_username() -> String {
    AppConfig::global().smtp_username.clone()
}

pub fn smtp_password() -> String {
    AppConfig::global().smtp_password.clone()
}

pub fn email_from_name() -> String {
    AppConfig::global().email_from_name.clone()
}

pub fn slack_webhook_url() -> String {
    AppConfig::global().slack_webhook_url.clone()
}

pub fn app_url() -> String {
    AppConfig::global().app_url.clone()
}

pub fn grading_clone_timeout_secs() -> u64 {
    AppConfig::global().grading_clone_timeout_secs
}

pub fn grading_eval_timeout_secs() -> u64 {
    AppConfig::global().grading_eval_timeout_secs
}

pub fn grading_max_retries() -> u32 {
    AppConfig::global().grading_max_retries
}
