//! Versioned PostgreSQL schema migrations

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::domain::DomainError;

/// Applies and reverts schema versions
#[async_trait(?Send)]
pub trait Migrator {
    /// Apply every pending migration in version order, returning how many ran
    async fn run(&self) -> Result<usize, DomainError>;

    /// Revert the latest applied migration, returning its version
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Latest applied version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// One schema step with its inverse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

const CREATE_USERS: Migration = Migration {
    version: 1,
    description: "Create users table",
    up: r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            password_hash TEXT NOT NULL,
            role VARCHAR(64) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT users_username_key UNIQUE (username)
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email, created_at);
    "#,
    down: "DROP TABLE IF EXISTS users;",
};

const CREATE_PRODUCTS: Migration = Migration {
    version: 2,
    description: "Create products table",
    up: r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            prod_name VARCHAR(50),
            prod_price DOUBLE PRECISION,
            prod_desc TEXT
        );
    "#,
    down: "DROP TABLE IF EXISTS products;",
};

/// Schema history, oldest first
pub fn storage_migrations() -> Vec<Migration> {
    vec![CREATE_USERS, CREATE_PRODUCTS]
}

/// Migrations from `all` whose versions are not in `applied`
fn pending<'a>(all: &'a [Migration], applied: &[i64]) -> Vec<&'a Migration> {
    all.iter()
        .filter(|m| !applied.contains(&m.version))
        .collect()
}

const CREATE_HISTORY_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version BIGINT PRIMARY KEY,
        description TEXT NOT NULL,
        installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const INSERT_HISTORY: &str = "INSERT INTO _migrations (version, description) VALUES ($1, $2)";

/// Tracks applied versions in a `_migrations` table
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

enum Direction {
    Up,
    Down,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, storage_migrations())
    }

    pub fn with_migrations(pool: PgPool, mut migrations: Vec<Migration>) -> Self {
        migrations.sort_by_key(|m| m.version);
        Self { pool, migrations }
    }

    async fn ensure_history(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_HISTORY_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to create migrations table: {}", e))
            })?;

        Ok(())
    }

    /// Versions recorded as applied, ascending
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_history().await?;

        sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read migration history: {}", e)))
    }

    /// Migrations not yet applied, in the order `run` would apply them
    pub async fn pending(&self) -> Result<Vec<Migration>, DomainError> {
        let applied = self.applied_versions().await?;
        Ok(pending(&self.migrations, &applied).into_iter().copied().collect())
    }

    /// Run one script and update the history in the same transaction
    async fn step(&self, migration: &Migration, direction: Direction) -> Result<(), DomainError> {
        let (script, verb) = match direction {
            Direction::Up => (migration.up, "apply"),
            Direction::Down => (migration.down, "revert"),
        };
        let fail = |stage: &str, e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to {} migration {} ({}): {}",
                verb, migration.version, stage, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(|e| fail("begin", e))?;

        // Scripts may hold several statements
        sqlx::raw_sql(script)
            .execute(&mut *tx)
            .await
            .map_err(|e| fail("script", e))?;

        let history = match direction {
            Direction::Up => sqlx::query(INSERT_HISTORY)
                .bind(migration.version)
                .bind(migration.description),
            Direction::Down => {
                sqlx::query("DELETE FROM _migrations WHERE version = $1").bind(migration.version)
            }
        };
        history.execute(&mut *tx).await.map_err(|e| fail("history", e))?;

        tx.commit().await.map_err(|e| fail("commit", e))?;

        info!(
            version = migration.version,
            description = migration.description,
            "Migration {}",
            if verb == "apply" { "applied" } else { "reverted" }
        );
        Ok(())
    }
}

#[async_trait(?Send)]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<usize, DomainError> {
        let pending = self.pending().await?;

        if pending.is_empty() {
            debug!("Schema is up to date");
        }

        for migration in &pending {
            self.step(migration, Direction::Up).await?;
        }

        Ok(pending.len())
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let Some(version) = self.version().await? else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| {
                DomainError::storage(format!(
                    "Applied migration {} is unknown to this build",
                    version
                ))
            })?;

        self.step(migration, Direction::Down).await?;
        Ok(Some(version))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        Ok(self.applied_versions().await?.last().copied())
    }
}

/// Apply pending storage migrations on `pool`
pub async fn run_storage_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let applied = PostgresMigrator::new(pool.clone()).run().await?;
    debug!(applied, "Storage migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_ascend_without_gaps() {
        let versions: Vec<i64> = storage_migrations().iter().map(|m| m.version).collect();
        let expected: Vec<i64> = (1..=versions.len() as i64).collect();

        assert_eq!(versions, expected);
    }

    #[test]
    fn test_every_migration_is_reversible() {
        for migration in storage_migrations() {
            assert!(!migration.description.is_empty());
            assert!(!migration.up.trim().is_empty());
            assert!(migration.down.contains("DROP TABLE"));
        }
    }

    #[test]
    fn test_pending_skips_applied() {
        let all = storage_migrations();

        let versions = |applied: &[i64]| -> Vec<i64> {
            pending(&all, applied).iter().map(|m| m.version).collect()
        };

        assert_eq!(versions(&[]), vec![1, 2]);
        assert_eq!(versions(&[1]), vec![2]);
        assert!(versions(&[1, 2]).is_empty());
    }

    #[test]
    fn test_users_table_enforces_unique_username() {
        assert!(CREATE_USERS.up.contains("UNIQUE (username)"));
        assert!(!CREATE_USERS.up.contains("UNIQUE (email)"));
    }

    #[test]
    fn test_product_name_width() {
        assert!(CREATE_PRODUCTS.up.contains(&format!(
            "prod_name VARCHAR({})",
            crate::domain::product::MAX_PRODUCT_NAME_LENGTH
        )));
    }
}
