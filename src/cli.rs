//! Command-line argument parsing for sqldesk.

use crate::config::{Config, EndpointConfig};
use crate::coordinator::ExecutionMode;
use crate::error::{Result, SqldeskError};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// SQL console core: statement splitting and remote execution orchestration.
#[derive(Parser, Debug)]
#[command(name = "sqldesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL file to execute (use "-" for stdin; stdin is also the default)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// SQL text to execute, instead of reading a file
    #[arg(short = 'e', long, value_name = "SQL", conflicts_with = "file")]
    pub sql: Option<String>,

    /// Execution service base URL
    #[arg(short = 'u', long, value_name = "URL", env = "SQLDESK_URL")]
    pub url: Option<String>,

    /// Use named endpoint from config
    #[arg(short = 'E', long, value_name = "NAME")]
    pub endpoint: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Submit the input verbatim as one unit, without splitting
    #[arg(long)]
    pub raw: bool,

    /// Keep executing remaining statements after one fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the named endpoint to use, if specified.
    pub fn endpoint_name(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the execution mode selected by the flags.
    pub fn execution_mode(&self) -> ExecutionMode {
        if self.raw {
            ExecutionMode::Raw
        } else {
            ExecutionMode::Multi
        }
    }

    /// Reads the SQL text from --sql, the file argument, or stdin.
    pub fn read_sql(&self) -> Result<String> {
        if let Some(sql) = &self.sql {
            return Ok(sql.clone());
        }

        match &self.file {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .map_err(|e| {
                    SqldeskError::config(format!("Failed to read {}: {e}", path.display()))
                }),
            _ => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| SqldeskError::config(format!("Failed to read stdin: {e}")))?;
                Ok(buffer)
            }
        }
    }

    /// Resolves the endpoint to use.
    ///
    /// Precedence: --url (or SQLDESK_URL), then the named endpoint, then the
    /// config's "default" entry. --timeout overrides the endpoint's timeout.
    pub fn resolve_endpoint(&self, config: &Config) -> Result<EndpointConfig> {
        let mut endpoint = if let Some(url) = &self.url {
            EndpointConfig::from_url(url)?
        } else if let Some(name) = self.endpoint_name() {
            config.get_endpoint(Some(name)).cloned().ok_or_else(|| {
                SqldeskError::config(format!("Endpoint '{name}' not found in config file"))
            })?
        } else if let Some(default) = config.get_endpoint(None) {
            default.clone()
        } else {
            return Err(SqldeskError::config(
                "No execution endpoint configured. Pass --url or add an [endpoints.default] entry.",
            ));
        };

        if let Some(timeout) = self.timeout {
            endpoint.timeout_secs = timeout;
        }
        endpoint.apply_env_defaults();

        Ok(endpoint)
    }
}
