//! Error types for the check-in client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, decoding and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for check-in client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (bad login, expired or missing session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success HTTP responses from the backend.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (URL, path, empty update).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A response body did not have the expected shape.
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl Error {
    /// Returns true when the only way forward is a fresh login.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::Auth(
                AuthError::NotLoggedIn
                    | AuthError::SessionExpired
                    | AuthError::RefreshFailed { .. }
                    | AuthError::RefreshAbandoned
            )
        )
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(e) => Some(e.status),
            Error::Auth(AuthError::RefreshFailed { status, .. }) => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode {
            message: err.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Email or password rejected by the backend.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No stored credentials to authenticate or refresh with.
    #[error("not logged in")]
    NotLoggedIn,

    /// The request was rejected again after a successful refresh.
    #[error("session expired")]
    SessionExpired,

    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("token refresh failed: {message}")]
    RefreshFailed {
        status: Option<u16>,
        message: String,
    },

    /// The task performing the refresh was dropped before it finished.
    #[error("token refresh was abandoned")]
    RefreshAbandoned,

    /// The credential store could not be read or written.
    #[error("credential store error: {message}")]
    Store { message: String },
}

/// Protocol-level errors from backend responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the backend's `{"error": ...}` body, if present.
    pub error: Option<String>,
    /// Additional message from the backend, if present.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, ": {}", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, " ({})", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid request path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}
