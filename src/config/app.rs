//! Application configuration loading from config.toml and the environment.
//!
//! The optional `config.toml` supplies defaults; `DATABASE_URL` and
//! `ADMIN_TOKEN` environment variables override it, so deployments can keep
//! secrets out of the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

fn default_database_url() -> String {
    "sqlite://data/order_buddy.sqlite?mode=rwc".to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where the SQLite database lives
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Token the admin presents to the authorization gate
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            admin_token: None,
        }
    }
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration: `./config.toml` if present, defaults
/// otherwise, with environment variable overrides applied on top.
///
/// # Errors
/// Returns an error if an existing config.toml cannot be parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(token) = std::env::var("ADMIN_TOKEN") {
        config.admin_token = Some(token);
    }

    Ok(config)
}
