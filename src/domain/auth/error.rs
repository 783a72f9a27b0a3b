//! Credential and token errors

use thiserror::Error;

use crate::domain::DomainError;

/// Failures of register, login and token verification
#[derive(Debug, Error)]
pub enum AuthError {
    /// A record with the same username already exists
    #[error("User already exists.")]
    AlreadyExists { username: String },

    /// No record for the supplied email
    #[error("User not found")]
    NotFound,

    /// The supplied password does not match the stored hash
    #[error("Invalid password")]
    InvalidCredentials,

    /// Signature, issuer, audience or format check failed
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    /// The token is past its expiry instant
    #[error("Token expired")]
    TokenExpired,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AuthError {
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Short outcome label for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound => "not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken { .. } => "invalid_token",
            Self::TokenExpired => "expired",
            Self::Domain(_) => "error",
        }
    }
}
