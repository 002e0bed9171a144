//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DISCOVERY_WORKSHOP` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use discovery_workshop::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Storage backend: {:?}", config.storage.backend);
//! ```

mod autosave;
mod database;
mod error;
mod remote;
mod server;
mod storage;

pub use autosave::AutosaveConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use remote::RemoteConfig;
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Sections for backends that are not selected may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Which backend stores workshop records
    #[serde(default)]
    pub storage: StorageConfig,

    /// PostgreSQL connection, required by the `postgres` backend
    pub database: Option<DatabaseConfig>,

    /// Upstream session service, required by the `remote` backend
    pub remote: Option<RemoteConfig>,

    /// Debounce and load-retry tuning
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DISCOVERY_WORKSHOP` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DISCOVERY_WORKSHOP__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DISCOVERY_WORKSHOP__STORAGE__BACKEND=file` -> `storage.backend = file`
    /// - `DISCOVERY_WORKSHOP__AUTOSAVE__DEBOUNCE_MS=400` -> `autosave.debounce_ms = 400`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DISCOVERY_WORKSHOP")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The `database` and `remote` sections are only checked, and only
    /// required, when their backend is selected.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.autosave.validate()?;

        match self.storage.backend {
            StorageBackend::Postgres => self
                .database
                .as_ref()
                .ok_or(ValidationError::MissingRequired("DATABASE__URL"))?
                .validate()?,
            StorageBackend::Remote => self
                .remote
                .as_ref()
                .ok_or(ValidationError::MissingRequired("REMOTE__BASE_URL"))?
                .validate(self.is_production())?,
            StorageBackend::Memory | StorageBackend::File => {}
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
