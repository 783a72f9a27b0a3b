//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;

use crate::domain::product::ProductRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::product::{InMemoryProductRepository, PostgresProductRepository};
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::migrations::run_storage_migrations;
use super::postgres::{connect_pool, PostgresConfig};

/// Supported storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    #[default]
    #[serde(alias = "in_memory", alias = "inmemory")]
    Memory,
    /// PostgreSQL storage
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

/// `storage` configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageType,
    /// Falls back to the `DATABASE_URL` environment variable
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Apply pending migrations when the server starts
    #[serde(default)]
    pub run_migrations: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageType::default(),
            database_url: None,
            max_connections: default_max_connections(),
            run_migrations: false,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

impl StorageConfig {
    /// Resolve the PostgreSQL pool settings
    pub fn postgres_config(&self) -> Result<PostgresConfig, DomainError> {
        let url = self
            .database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| {
                DomainError::configuration(
                    "storage.database_url or DATABASE_URL is required for the postgres backend",
                )
            })?;

        Ok(PostgresConfig::new(url).with_max_connections(self.max_connections))
    }
}

/// Repositories backing the application services
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            products: Arc::new(PostgresProductRepository::new(pool)),
        }
    }
}

/// Factory for creating repositories
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Build repositories for the configured backend
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config.backend {
            StorageType::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Repositories::in_memory())
            }
            StorageType::Postgres => {
                let pool = connect_pool(&config.postgres_config()?).await?;

                if config.run_migrations {
                    run_storage_migrations(&pool).await?;
                }

                Ok(Repositories::postgres(pool))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_aliases() {
        let parse = |s: &str| serde_json::from_value::<StorageType>(serde_json::json!(s)).unwrap();

        assert_eq!(parse("memory"), StorageType::Memory);
        assert_eq!(parse("in_memory"), StorageType::Memory);
        assert_eq!(parse("postgres"), StorageType::Postgres);
        assert_eq!(parse("pg"), StorageType::Postgres);
    }

    #[test]
    fn test_explicit_database_url() {
        let config = StorageConfig {
            backend: StorageType::Postgres,
            database_url: Some("postgres://db/catalog".to_string()),
            max_connections: 3,
            run_migrations: false,
        };

        let pg = config.postgres_config().unwrap();
        assert_eq!(pg.url, "postgres://db/catalog");
        assert_eq!(pg.max_connections, 3);
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let repositories = StorageFactory::create(&StorageConfig::default()).await.unwrap();

        assert_eq!(repositories.users.count().await.unwrap(), 0);
        assert!(repositories.products.list().await.unwrap().is_empty());
    }
}
