//! Error types for user domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing user domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user identifier is empty or contains whitespace.
    #[error("invalid user identifier '{0}'")]
    InvalidUserId(String),

    /// The user name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The email address is empty after trimming.
    #[error("user email must not be empty")]
    EmptyEmail,

    /// The email address is not of the form `local@domain`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// Error returned while parsing notification kinds or methods.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification value: {0}")]
pub struct ParseNotificationError(pub String);
