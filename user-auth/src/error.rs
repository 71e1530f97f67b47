use std::path::PathBuf;

use thiserror::Error;

/// Account and session failures.
///
/// The user-facing variants carry the exact text shown to the person signing in.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password is required.")]
    EmptyPassword,

    #[error("Email already exists.")]
    EmailTaken,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("user store at {path} is not readable or writable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("user store at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AuthError {
    /// `true` for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidEmail
                | AuthError::EmptyPassword
                | AuthError::EmailTaken
                | AuthError::InvalidCredentials
        )
    }
}
