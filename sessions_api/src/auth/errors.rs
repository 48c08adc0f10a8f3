//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required credential field missing or blank
    #[error("Missing username or password")]
    MissingCredentials,

    /// Unknown username or wrong password. One variant for both cases so
    /// that account existence cannot be probed through login responses.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session token presented
    #[error("Session token missing")]
    SessionMissing,

    /// Session token malformed or signature mismatch
    #[error("Invalid session token")]
    SessionInvalid,

    /// Session token expired
    #[error("Session expired")]
    SessionExpired,

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token signing error
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Record store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store and token errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize store errors - don't expose backend details
            AuthError::Store(_) => "Internal server error".to_string(),
            // Sanitize token errors - don't expose token structure
            AuthError::Token(_) | AuthError::HashingFailed => "Internal server error".to_string(),
            // All other errors are safe to expose
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
