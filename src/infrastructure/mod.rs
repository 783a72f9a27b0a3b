//! Infrastructure layer - storage, hashing, tokens and observability

pub mod auth;
pub mod logging;
pub mod observability;
pub mod product;
pub mod storage;
pub mod user;
