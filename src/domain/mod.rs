//! Domain layer - entities, repository traits and error kinds

pub mod auth;
pub mod error;
pub mod product;
pub mod user;

pub use auth::{AuthError, IssuedToken, LoginCredentials, RegisterCredentials, TokenClaims};
pub use error::DomainError;
pub use product::{Product, ProductDraft, ProductRepository};
pub use user::{NewUser, User, UserId, UserRepository};
