//! Migrate command - applies or reverts the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::migrations::Migrator;
use crate::infrastructure::storage::{connect_pool, PostgresMigrator};

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying pending ones
    #[arg(long, conflicts_with = "status")]
    pub revert: bool,

    /// List pending migrations without applying them
    #[arg(long)]
    pub status: bool,

    /// Database URL, overriding `storage.database_url` and `DATABASE_URL`
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    init_logging(&config.logging);

    if let Some(url) = args.database_url {
        config.storage.database_url = Some(url);
    }

    let pool = connect_pool(&config.storage.postgres_config()?).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.status {
        for migration in migrator.pending().await? {
            info!(version = migration.version, description = migration.description, "Pending");
        }
    } else if args.revert {
        match migrator.revert().await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("Nothing to revert"),
        }
    } else {
        let applied = migrator.run().await?;
        info!(applied, "Applied pending migrations");
    }

    info!(version = ?migrator.version().await?, "Schema is at version");

    Ok(())
}
