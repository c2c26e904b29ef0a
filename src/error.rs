//! Error types for sqldesk.
//!
//! Defines the main error enum used throughout the crate.
//!
//! A SQL error reported by the remote executor for one statement is *not* an
//! error in this sense; it becomes a `ResultRecord::Error` in the result
//! batch. This enum covers failures of the submission as a whole.

use thiserror::Error;

/// Main error type for sqldesk operations.
#[derive(Error, Debug)]
pub enum SqldeskError {
    /// Transport errors (endpoint unreachable, request aborted, HTTP failure).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol errors (malformed or unparseable remote response).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors (invalid config file, bad endpoint URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqldeskError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::Protocol(_) => "Protocol Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SqldeskError.
pub type Result<T> = std::result::Result<T, SqldeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = SqldeskError::transport("connection refused (localhost:8080)");
        assert_eq!(
            err.to_string(),
            "Transport error: connection refused (localhost:8080)"
        );
        assert_eq!(err.category(), "Transport Error");
    }

    #[test]
    fn test_error_display_protocol() {
        let err = SqldeskError::protocol("missing field `outcomes`");
        assert_eq!(err.to_string(), "Protocol error: missing field `outcomes`");
        assert_eq!(err.category(), "Protocol Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = SqldeskError::config("endpoint 'prod' not found in config file");
        assert_eq!(
            err.to_string(),
            "Configuration error: endpoint 'prod' not found in config file"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = SqldeskError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqldeskError>();
    }
}
