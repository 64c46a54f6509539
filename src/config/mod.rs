use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::locale::{LocaleCookie, LOCALE_COOKIE_NAME};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOOTSTRAP_ADMIN_ID must be set with BOOTSTRAP_ADMIN_EMAIL outside development")]
    BootstrapIdMissing,
}

/// Who to seed as the first admin. `generated` ids match no identity-provider
/// subject until the profile is relinked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub id: Uuid,
    pub email: String,
    pub generated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub locale: LocaleConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Row store connection; the in-memory store is used when unset.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
    /// Seeded as the first admin when the broker table is empty.
    pub bootstrap_admin_email: Option<String>,
    /// Identity provider subject for the bootstrap admin; generated when unset.
    pub bootstrap_admin_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub cookie_name: String,
    pub cookie_max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub attachments_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var("KR_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = port.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_EMAIL") {
            self.security.bootstrap_admin_email = Some(v).filter(|email| !email.trim().is_empty());
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_ID") {
            self.security.bootstrap_admin_id = Uuid::parse_str(v.trim()).ok();
        }

        if let Ok(v) = env::var("LOCALE_COOKIE_NAME") {
            self.locale.cookie_name = v;
        }
        if let Ok(v) = env::var("LOCALE_COOKIE_MAX_AGE_SECS") {
            self.locale.cookie_max_age_secs = v.parse().unwrap_or(self.locale.cookie_max_age_secs);
        }

        if let Ok(v) = env::var("STORAGE_ATTACHMENTS_DIR") {
            self.storage.attachments_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("STORAGE_MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = v.parse().unwrap_or(self.storage.max_upload_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                secure_cookies: false,
                bootstrap_admin_email: None,
                bootstrap_admin_id: None,
            },
            locale: LocaleConfig::default(),
            storage: StorageConfig {
                attachments_dir: PathBuf::from("./data/attachments"),
                max_upload_bytes: 25 * 1024 * 1024, // 25MB
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
                secure_cookies: true,
                bootstrap_admin_email: None,
                bootstrap_admin_id: None,
            },
            locale: LocaleConfig::default(),
            storage: StorageConfig {
                attachments_dir: PathBuf::from("/var/lib/kr-portal/attachments"),
                max_upload_bytes: 25 * 1024 * 1024,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                cors_origins: vec!["https://www.example.com".to_string()],
                secure_cookies: true,
                bootstrap_admin_email: None,
                bootstrap_admin_id: None,
            },
            locale: LocaleConfig::default(),
            storage: StorageConfig {
                attachments_dir: PathBuf::from("/var/lib/kr-portal/attachments"),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    pub fn bootstrap_admin(&self) -> Result<Option<BootstrapAdmin>, ConfigError> {
        let Some(email) = self.security.bootstrap_admin_email.clone() else {
            return Ok(None);
        };
        match self.security.bootstrap_admin_id {
            Some(id) => Ok(Some(BootstrapAdmin { id, email, generated: false })),
            None if self.environment == Environment::Development => {
                Ok(Some(BootstrapAdmin { id: Uuid::new_v4(), email, generated: true }))
            }
            None => Err(ConfigError::BootstrapIdMissing),
        }
    }

    pub fn locale_cookie(&self) -> LocaleCookie {
        LocaleCookie {
            name: self.locale.cookie_name.clone(),
            max_age_secs: self.locale.cookie_max_age_secs,
            secure: self.security.secure_cookies,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            cookie_name: LOCALE_COOKIE_NAME.to_string(),
            cookie_max_age_secs: crate::locale::cookie::ONE_YEAR_SECS,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
