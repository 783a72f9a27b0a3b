//! Authentication domain
//!
//! Credential payloads, token claims and the error kinds of the
//! register/login/verify contract.

mod claims;
mod credentials;
mod error;

pub use claims::{IssuedToken, TokenClaims};
pub use credentials::{LoginCredentials, RegisterCredentials};
pub use error::AuthError;
