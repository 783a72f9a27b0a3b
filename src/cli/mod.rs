//! CLI module for the catalog API
//!
//! Provides subcommands:
//! - `serve`: HTTP API server (default)
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Catalog Auth API - product catalog with JWT registration and login
#[derive(Parser)]
#[command(name = "catalog-auth-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default mode)
    Serve,

    /// Apply database migrations
    Migrate(migrate::MigrateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["catalog-auth-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_migrate_flags() {
        let cli = Cli::try_parse_from(["catalog-auth-api", "migrate", "--revert"]).unwrap();

        match cli.command {
            Some(Command::Migrate(args)) => {
                assert!(args.revert);
                assert!(!args.status);
                assert!(args.database_url.is_none());
            }
            _ => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_revert_conflicts_with_status() {
        let result = Cli::try_parse_from(["catalog-auth-api", "migrate", "--revert", "--status"]);
        assert!(result.is_err());
    }
}
