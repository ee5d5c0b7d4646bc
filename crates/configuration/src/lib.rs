use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AuthSettings, DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads and validates the application settings.
///
/// Sources are layered, later ones winning: built-in defaults, the TOML file at
/// `path` (or `config.toml`, which may be absent), `TALLY__SECTION__KEY`
/// environment variables, and finally a plain `DATABASE_URL`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.min_connections", 1)?
        .set_default("database.max_connections", 5)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("database.idle_timeout_secs", 600)?
        .set_default("database.run_migrations", true)?
        .set_default("auth.session_ttl_secs", 8 * 60 * 60)?
        .set_default("auth.cookie_name", "tally_session")?
        .set_default("auth.secure_cookie", false)?
        .set_default("logging.filter", "info")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("TALLY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
