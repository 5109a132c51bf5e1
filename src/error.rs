//! Error types shared by the server and the terminal client.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WebUiError>;

/// Errors that can occur while serving or consuming the dashboard API.
#[derive(Debug, Error)]
pub enum WebUiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("Request failed: {status} {status_text}")]
    Request {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// Failed to parse a payload.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The collaborator plugin is missing or its state could not be read.
    #[error("QQSync plugin unavailable: {0}")]
    Bridge(String),

    /// A named resource (usually a player) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid or unloadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for WebUiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebUiError::Timeout
        } else if err.is_connect() {
            WebUiError::Connection(err.to_string())
        } else if err.is_decode() {
            WebUiError::Parse(err.to_string())
        } else {
            WebUiError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WebUiError {
    fn from(err: serde_json::Error) -> Self {
        WebUiError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for WebUiError {
    fn from(err: config::ConfigError) -> Self {
        WebUiError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_carries_status_text() {
        let err = WebUiError::Request {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed: 503 Service Unavailable");
    }

    #[test]
    fn test_json_error_becomes_parse() {
        let err: WebUiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, WebUiError::Parse(_)));
    }
}
