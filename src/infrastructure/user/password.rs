//! Password hashing utilities
//!
//! `Argon2Hasher` produces salted PHC strings and is the default.
//! `Sha256Hasher` reproduces the legacy stored format: an unsalted SHA-256
//! digest of the UTF-8 bytes, encoded as padded standard base64.

use argon2::{
    password_hash::{
        PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{AuthSettings, PasswordHashing};
use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    accept_legacy: bool,
}

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self::default()
    }

    /// Also verify legacy SHA-256 digests written before the switch to Argon2
    pub fn accepting_legacy(mut self, accept_legacy: bool) -> Self {
        self.accept_legacy = accept_legacy;
        self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        if self.accept_legacy && is_legacy_digest(hash) {
            return Sha256Hasher.verify(password, hash);
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Legacy unsalted SHA-256 hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    pub fn new() -> Self {
        Self
    }

    fn digest(password: &str) -> String {
        STANDARD.encode(Sha256::digest(password.as_bytes()))
    }
}

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(Self::digest(password))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        constant_time_eq(Self::digest(password).as_bytes(), hash.as_bytes())
    }
}

/// Build the hasher selected by `auth.password_hashing`
pub fn create_password_hasher(settings: &AuthSettings) -> Arc<dyn PasswordHasher> {
    match settings.password_hashing {
        PasswordHashing::Argon2 => {
            Arc::new(Argon2Hasher::new().accepting_legacy(settings.accept_legacy_hashes))
        }
        PasswordHashing::Sha256 => Arc::new(Sha256Hasher::new()),
    }
}

/// A 32-byte digest in padded base64 is always 44 characters
fn is_legacy_digest(hash: &str) -> bool {
    hash.len() == 44
        && !hash.starts_with('$')
        && STANDARD
            .decode(hash)
            .map(|bytes| bytes.len() == 32)
            .unwrap_or(false)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
