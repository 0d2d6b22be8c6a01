// ABOUTME: CLI entry point for pg-table-copier
// ABOUTME: Parses commands and routes to appropriate handlers

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use pg_table_copier::commands;
use pg_table_copier::config::{ConfigOverrides, MigrationConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pg-table-copier")]
#[command(about = "Copy rows table by table between PostgreSQL databases", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct ConnectionArgs {
    /// Source database URL (overrides [source] in the config file)
    #[arg(long)]
    source: Option<String>,
    /// Target database URL (overrides [target] in the config file)
    #[arg(long)]
    target: Option<String>,
    /// Tables to copy in order, parents first (comma-separated, optionally schema.table)
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<String>>,
    /// Path to a TOML file with [source], [target] and tables
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
}

impl ConnectionArgs {
    fn into_config(self) -> anyhow::Result<MigrationConfig> {
        let overrides = ConfigOverrides {
            source_url: self.source,
            target_url: self.target,
            tables: self.tables,
        };
        MigrationConfig::load(self.config_path.as_deref(), overrides)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every configured table from source to target
    Migrate {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Exit with an error if any row failed to insert
        #[arg(long)]
        strict: bool,
    },
    /// Check connectivity, table presence and dependency order without copying
    Validate {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { connection, strict } => {
            let config = connection.into_config()?;
            let report = commands::migrate(&config).await?;
            if strict && !report.is_complete() {
                bail!(
                    "{} of {} rows failed to migrate",
                    report.failed(),
                    report.attempted()
                );
            }
            Ok(())
        }
        Commands::Validate { connection } => {
            let config = connection.into_config()?;
            commands::validate(&config).await
        }
    }
}
