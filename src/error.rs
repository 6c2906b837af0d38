//! Error types for the Dominion Energy client
//!
//! Two failure classes matter to callers: [`DominionError::Auth`] means the
//! credentials or the bearer token were rejected and the caller should
//! re-authenticate (or re-prompt), everything else is a softer failure that a
//! later poll may recover from.

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, DominionError>;

/// Main error type for the client
#[derive(Debug, Error)]
pub enum DominionError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Transport-level failures (connect, TLS, timeouts, body read)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Data endpoint failures: unexpected HTTP status or embedded API status
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Login sequence exhausted or token rejected
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl DominionError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        DominionError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        DominionError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        DominionError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        DominionError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error without an HTTP status
    pub fn api<S: Into<String>>(message: S) -> Self {
        DominionError::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new API error for an unexpected HTTP status
    pub fn api_status<S: Into<String>>(status: u16, message: S) -> Self {
        DominionError::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        DominionError::Auth {
            message: message.into(),
        }
    }

    /// Whether the caller should re-authenticate
    pub fn is_auth(&self) -> bool {
        matches!(self, DominionError::Auth { .. })
    }

    /// HTTP status attached to an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DominionError::Api { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<std::io::Error> for DominionError {
    fn from(err: std::io::Error) -> Self {
        DominionError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for DominionError {
    fn from(err: serde_yaml::Error) -> Self {
        DominionError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DominionError {
    fn from(err: serde_json::Error) -> Self {
        DominionError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for DominionError {
    fn from(err: reqwest::Error) -> Self {
        DominionError::network(err.to_string())
    }
}
