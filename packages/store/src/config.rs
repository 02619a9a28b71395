//! # Application configuration (`jotter.toml`)
//!
//! The server reads an optional TOML file at startup and then lets environment
//! variables override individual values.
//!
//! ## Structure
//!
//! ```toml
//! [server]
//! address = "127.0.0.1:8080"
//!
//! [database]
//! url = "sqlite://jotter.db"
//!
//! [storage]
//! static_root = "static"      # uploads land in <static_root>/uploads/<user_id>/
//!
//! [session]
//! secure = false              # set the Secure cookie flag (HTTPS deployments)
//! remember_days = 365         # lifetime of a "remember me" session
//! ```
//!
//! ## Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BIND_ADDRESS` | `server.address` |
//! | `DATABASE_URL` | `database.url` |
//! | `STATIC_ROOT` | `storage.static_root` |
//! | `SESSION_SECURE` | `session.secure` |
//! | `REMEMBER_DAYS` | `session.remember_days` |
//!
//! All structs derive `Default`, so a missing or empty file is equivalent to
//! the default configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory served under `/static`.
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_remember_days")]
    pub remember_days: u32,
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://jotter.db".to_string()
}

fn default_static_root() -> PathBuf {
    PathBuf::from("static")
}

fn default_remember_days() -> u32 {
    365
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_root: default_static_root(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure: false,
            remember_days: default_remember_days(),
        }
    }
}

impl AppConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "jotter.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("BIND_ADDRESS") {
            self.server.address = address;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(root) = lookup("STATIC_ROOT") {
            self.storage.static_root = PathBuf::from(root);
        }
        if let Some(value) = lookup("SESSION_SECURE") {
            self.session.secure = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        key: "SESSION_SECURE",
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup("REMEMBER_DAYS") {
            self.session.remember_days =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: "REMEMBER_DAYS",
                        value: value.clone(),
                    })?;
        }
        Ok(self)
    }

    /// Directory uploads are written to.
    pub fn upload_root(&self) -> PathBuf {
        self.storage.static_root.join("uploads")
    }
}
