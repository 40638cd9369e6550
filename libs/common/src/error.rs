//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every crate that talks to
//! the marketplace backend or touches durable client storage.

use thiserror::Error;

/// Error returned by calls to the marketplace backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (refused, reset, deadline hit)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the bearer token (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other non-success status, with the message taken from the body
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Network(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Decode(msg) => msg,
            ApiError::Status { message, .. } => message,
        }
    }

    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    /// True when the error means the session credential is no longer valid
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Error raised by durable key/value storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid key/value document
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Error raised while loading client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
