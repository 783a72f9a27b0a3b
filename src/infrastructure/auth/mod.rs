//! Authentication infrastructure module
//!
//! This module provides bearer token management for user authentication.

mod jwt;

pub use jwt::{JwtService, TokenConfig, TokenGenerator};
