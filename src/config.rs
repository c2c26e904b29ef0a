//! Configuration management for sqldesk.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named execution endpoints.

use crate::error::{Result, SqldeskError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for sqldesk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named execution endpoints. The entry named "default" is used when no
    /// endpoint is selected explicitly.
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointConfig>,
}

/// One execution-service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the execution service.
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Creates an endpoint config from a URL, validating its shape.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| SqldeskError::config(format!("Invalid endpoint URL '{url}': {e}")))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SqldeskError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            url: url.to_string(),
            timeout_secs: default_timeout_secs(),
        })
    }

    /// Applies environment variables as defaults.
    ///
    /// `SQLDESK_TIMEOUT_SECS` overrides the timeout when it is still the
    /// built-in default.
    pub fn apply_env_defaults(&mut self) {
        if self.timeout_secs == default_timeout_secs() {
            if let Ok(secs) = std::env::var("SQLDESK_TIMEOUT_SECS") {
                if let Ok(secs) = secs.parse() {
                    self.timeout_secs = secs;
                }
            }
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqldesk")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error; it yields the default (empty) config.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqldeskError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SqldeskError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Returns the endpoint with the given name, or the "default" entry when
    /// no name is given.
    pub fn get_endpoint(&self, name: Option<&str>) -> Option<&EndpointConfig> {
        self.endpoints.get(name.unwrap_or("default"))
    }
}
