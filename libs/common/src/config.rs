//! Client configuration
//!
//! Values are layered: built-in defaults, then an optional `marketplace.toml`
//! in the working directory, then `MARKETPLACE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

/// Default backend address used by the marketplace client
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Name of the optional configuration file (without extension)
pub const CONFIG_FILE: &str = "marketplace";

/// Retries on idempotent GETs never go above this
pub const MAX_GET_RETRIES: u32 = 1;

/// Configuration for the marketplace client
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:8081")
    pub base_url: String,
    /// Deadline applied to every outbound request, in seconds
    pub request_timeout_secs: u64,
    /// Retries allowed for idempotent GETs on transport failure
    pub get_retries: u32,
    /// File holding the persisted session
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            get_retries: MAX_GET_RETRIES,
            session_file: default_session_file(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `marketplace.toml` (if present) and the environment
    ///
    /// # Environment Variables
    /// - `MARKETPLACE_BASE_URL`: backend address (default: "http://localhost:8081")
    /// - `MARKETPLACE_REQUEST_TIMEOUT_SECS`: request deadline (default: 10)
    /// - `MARKETPLACE_GET_RETRIES`: GET retry budget, at most 1 (default: 1)
    /// - `MARKETPLACE_SESSION_FILE`: persisted session location
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("MARKETPLACE").try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validated()
    }

    /// Load configuration from the environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(Environment::with_prefix("MARKETPLACE").try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validated()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = ClientConfig::default();
        let builder = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("get_retries", i64::from(defaults.get_retries))?
            .set_default(
                "session_file",
                defaults.session_file.to_string_lossy().into_owned(),
            )?;
        Ok(builder)
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.get_retries = self.get_retries.min(MAX_GET_RETRIES);
        Ok(self)
    }

    /// Request deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_session_file() -> PathBuf {
    std::env::temp_dir().join("marketplace-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "MARKETPLACE_BASE_URL",
            "MARKETPLACE_REQUEST_TIMEOUT_SECS",
            "MARKETPLACE_GET_RETRIES",
            "MARKETPLACE_SESSION_FILE",
        ] {
            // SAFETY: tests touching the environment run serially
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        clear_env();
        let config = ClientConfig::from_env().expect("Failed to create client config");
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.get_retries, 1);
        assert!(config.session_file.ends_with("marketplace-session.json"));
    }

    #[test]
    #[serial]
    fn test_client_config_from_env() {
        clear_env();
        // SAFETY: tests touching the environment run serially
        unsafe {
            std::env::set_var("MARKETPLACE_BASE_URL", "http://backend:9000/");
            std::env::set_var("MARKETPLACE_REQUEST_TIMEOUT_SECS", "3");
            std::env::set_var("MARKETPLACE_GET_RETRIES", "5");
        }

        let config = ClientConfig::from_env().expect("Failed to create client config");
        clear_env();

        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.get_retries, MAX_GET_RETRIES);
    }

    #[test]
    #[serial]
    fn test_client_config_rejects_zero_timeout() {
        clear_env();
        // SAFETY: tests touching the environment run serially
        unsafe { std::env::set_var("MARKETPLACE_REQUEST_TIMEOUT_SECS", "0") };

        let result = ClientConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
