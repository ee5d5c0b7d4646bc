use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Connection parameters and bounds for the database pool.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// A `postgres://` connection string.
    pub url: String,
    /// Connections kept open even when idle.
    pub min_connections: u32,
    /// Hard cap on simultaneously open connections.
    pub max_connections: u32,
    /// How long a caller waits for a free connection before giving up.
    pub acquire_timeout_secs: u64,
    /// Idle connections above the minimum are closed after this long.
    pub idle_timeout_secs: u64,
    /// Apply pending schema migrations when the server starts.
    pub run_migrations: bool,
}

/// The single account allowed to log in, and how its session is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub username: String,
    pub password: String,
    pub session_ttl_secs: u64,
    pub cookie_name: String,
    /// Mark the session cookie `Secure`. Enable when served over HTTPS.
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub filter: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Settings {
    /// Checks the cross-field rules that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        if db.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must be set".to_string(),
            ));
        }
        if db.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::ValidationError(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }
        if db.acquire_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "database.acquire_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.auth.username.trim().is_empty() || self.auth.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.username and auth.password must both be set".to_string(),
            ));
        }
        if self.auth.session_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_ttl_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl AuthSettings {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
