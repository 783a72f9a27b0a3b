//! User infrastructure module
//!
//! This module provides password hashing with Argon2 and legacy SHA-256,
//! in-memory and PostgreSQL repositories, and the credential service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{create_password_hasher, Argon2Hasher, PasswordHasher, Sha256Hasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::CredentialService;
