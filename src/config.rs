//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8080
/// - `GOALSERVE_URL` / `GOALSERVE_API_KEY`: upstream feed location and credential
/// - `SYNC_INTERVAL_SECS`: period between reconciliation cycles, defaults to 60
/// - `FEED_TIMEOUT_SECS`: per-fetch timeout, defaults to 30
/// - `FEED_REQUEST_SPACING_MS`: minimum gap between upstream requests, defaults to 1000
/// - `SHUTDOWN_GRACE_SECS`: how long in-flight work may run after a shutdown signal
/// - `CORS_ALLOWED_ORIGINS`: comma separated origins, any origin when unset
/// - `LAST_USED_QUEUE_CAPACITY`: bound of the credential last-used update queue
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_goalserve_url")]
    pub goalserve_url: String,

    #[serde(default)]
    pub goalserve_api_key: String,

    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,

    #[serde(default = "default_feed_request_spacing_ms")]
    pub feed_request_spacing_ms: u64,

    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default = "default_last_used_queue_capacity")]
    pub last_used_queue_capacity: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_goalserve_url() -> String {
    "https://www.goalserve.com".to_string()
}

fn default_sync_interval_secs() -> u64 {
    60
}

fn default_feed_timeout_secs() -> u64 {
    30
}

fn default_feed_request_spacing_ms() -> u64 {
    1000
}

fn default_shutdown_grace_secs() -> u64 {
    30
}

fn default_last_used_queue_capacity() -> usize {
    1024
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are converted automatically: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs.max(1))
    }

    pub fn feed_request_spacing(&self) -> Duration {
        Duration::from_millis(self.feed_request_spacing_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Allowed CORS origins, `None` meaning any origin.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let raw = self.cors_allowed_origins.as_deref()?;
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            None
        } else {
            Some(origins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter::<_, Config>(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/sports")]);

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.goalserve_url, "https://www.goalserve.com");
        assert_eq!(config.sync_interval(), Duration::from_secs(60));
        assert_eq!(config.feed_request_spacing(), Duration::from_millis(1000));
        assert_eq!(config.last_used_queue_capacity, 1024);
        assert!(config.allowed_origins().is_none());
    }

    #[test]
    fn wildcard_or_blank_origins_mean_any_origin() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/sports"),
            ("CORS_ALLOWED_ORIGINS", " * , "),
        ]);
        assert!(config.allowed_origins().is_none());

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/sports"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]);
        assert_eq!(
            config.allowed_origins().unwrap(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = envy::from_iter::<_, Config>(Vec::<(String, String)>::new());
        assert!(result.is_err());
    }
}
