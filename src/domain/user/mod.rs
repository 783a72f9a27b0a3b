//! User domain
//!
//! This module provides the user record entity and the repository trait that
//! the credential service stores users through.

mod entity;
mod repository;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;

#[cfg(test)]
pub use repository::mock::MockUserRepository;
