//! crates/rttc_core/src/error.rs
//!
//! Error values returned by the stores. Their `Display` output is the message shown
//! to the user.

use crate::ports::PortError;

/// Failure of a history or phrase store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    /// Language detection for a new phrase failed.
    #[error("Could not detect the language: {0}")]
    Detection(String),
    /// The backend refused or failed the operation.
    #[error("{0}")]
    Persistence(String),
}

impl From<PortError> for StoreError {
    fn from(e: PortError) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

/// Failure of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("User not found.")]
    UserNotFound,
    #[error("Incorrect password.")]
    WrongPassword,
    #[error("This email is already registered.")]
    EmailTaken,
    #[error("{0}")]
    Validation(String),
    #[error("You must be signed in to do that.")]
    NotSignedIn,
    #[error("Unexpected sign-in error: {0}")]
    Unexpected(String),
}
