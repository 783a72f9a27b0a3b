//! Catalog Auth API
//!
//! A product catalog REST service with:
//! - Username/password registration and email login issuing HS256 JWTs
//! - Product CRUD with bearer-protected mutations
//! - In-memory or PostgreSQL storage
//! - Prometheus metrics and structured logging

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::{
    auth::JwtService,
    product::ProductService,
    storage::StorageFactory,
    user::{create_password_hasher, CredentialService},
};
use tracing::info;

/// Create the application state with custom configuration
///
/// Fails when the token settings are incomplete or storage cannot be reached.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let token_config = config.jwt.token_config()?;
    let tokens = Arc::new(JwtService::new(token_config)?);
    let hasher = create_password_hasher(&config.auth);

    info!(
        backend = ?config.storage.backend,
        hashing = ?config.auth.password_hashing,
        "Initializing application state"
    );

    let repositories = StorageFactory::create(&config.storage).await?;

    let credential_service = CredentialService::new(
        repositories.users,
        hasher,
        tokens,
        config.auth.default_role.clone(),
    );
    let product_service = ProductService::new(repositories.products);

    Ok(AppState::new(credential_service, product_service))
}
