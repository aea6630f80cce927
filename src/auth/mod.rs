//! Authentication: identity storage, credential hashing, token issuance and
//! the service that coordinates them.

pub mod identity;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

pub use identity::*;
pub use models::*;
pub use password::*;
pub use service::*;
pub use token::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// A single identity validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Passwords must be at least {0} characters.")]
    PasswordTooShort(usize),

    #[error("Passwords must have at least one digit ('0'-'9').")]
    PasswordRequiresDigit,

    #[error("Passwords must have at least one lowercase ('a'-'z').")]
    PasswordRequiresLower,

    #[error("Passwords must have at least one uppercase ('A'-'Z').")]
    PasswordRequiresUpper,

    #[error("Passwords must have at least one non alphanumeric character.")]
    PasswordRequiresNonAlphanumeric,

    #[error("Email '{0}' is invalid.")]
    InvalidEmail(String),

    #[error("Name must be between 1 and {0} characters.")]
    InvalidName(usize),

    #[error("Username '{0}' is already taken.")]
    DuplicateUserName(String),

    #[error("Email '{0}' is already taken.")]
    DuplicateEmail(String),
}

impl IdentityError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PasswordTooShort(_) => "PasswordTooShort",
            Self::PasswordRequiresDigit => "PasswordRequiresDigit",
            Self::PasswordRequiresLower => "PasswordRequiresLower",
            Self::PasswordRequiresUpper => "PasswordRequiresUpper",
            Self::PasswordRequiresNonAlphanumeric => "PasswordRequiresNonAlphanumeric",
            Self::InvalidEmail(_) => "InvalidEmail",
            Self::InvalidName(_) => "InvalidName",
            Self::DuplicateUserName(_) => "DuplicateUserName",
            Self::DuplicateEmail(_) => "DuplicateEmail",
        }
    }
}

/// Why a registration did not produce an identity.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Registration rejected: {}", .0.first().map(ToString::to_string).unwrap_or_default())]
    Rejected(Vec<IdentityError>),

    #[error("Error encountered")]
    Internal(#[from] DatabaseError),
}

impl RegistrationError {
    /// Single-line description: the first validation failure, or a
    /// generic message for internal failures.
    pub fn first_message(&self) -> String {
        match self {
            Self::Rejected(errors) => errors
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| "Registration rejected".to_string()),
            Self::Internal(_) => "Error encountered".to_string(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Rejected(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::Internal(_) => vec!["Error encountered".to_string()],
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}
