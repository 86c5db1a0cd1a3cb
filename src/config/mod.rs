//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `EVENT_USHER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use event_usher::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod error;
mod pretix;
mod server;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use pretix::PretixConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the Event Usher service.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Ticketing platform configuration (instance URL, OAuth client)
    pub pretix: PretixConfig,

    /// Storage configuration (snapshot directory)
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `EVENT_USHER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `EVENT_USHER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EVENT_USHER__PRETIX__CLIENT_ID=...` -> `pretix.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required environment variables are missing or
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EVENT_USHER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.pretix.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("EVENT_USHER__PRETIX__CLIENT_ID", "usher-client");
        env::set_var("EVENT_USHER__PRETIX__CLIENT_SECRET", "s3cret");
        env::set_var(
            "EVENT_USHER__PRETIX__REDIRECT_URL",
            "https://usher.example.org/callback",
        );
    }

    fn clear_env() {
        env::remove_var("EVENT_USHER__PRETIX__CLIENT_ID");
        env::remove_var("EVENT_USHER__PRETIX__CLIENT_SECRET");
        env::remove_var("EVENT_USHER__PRETIX__REDIRECT_URL");
        env::remove_var("EVENT_USHER__PRETIX__INSTANCE_URL");
        env::remove_var("EVENT_USHER__SERVER__PORT");
        env::remove_var("EVENT_USHER__STORAGE__DATA_DIR");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.pretix.client_id, "usher-client");
        assert_eq!(config.pretix.instance_url, "https://pretix.eu");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_custom_instance_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var(
            "EVENT_USHER__PRETIX__INSTANCE_URL",
            "https://tickets.example.org",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pretix.instance_url, "https://tickets.example.org");
    }
}
