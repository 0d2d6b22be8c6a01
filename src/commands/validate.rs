// ABOUTME: Pre-flight validation command for a table copy
// ABOUTME: Checks connectivity, table presence on both sides, and dependency order

use crate::config::MigrationConfig;
use crate::migration::{self, TableName};
use crate::postgres::{self, catalog};
use anyhow::{bail, Context, Result};

pub async fn validate(config: &MigrationConfig) -> Result<()> {
    tracing::info!("Starting validation...");

    tracing::info!("Connecting to source database...");
    let source_client = postgres::connect(&config.source_url)
        .await
        .context("Failed to connect to source database")?;
    tracing::info!("✓ Connected to source");

    tracing::info!("Connecting to target database...");
    let target_client = postgres::connect(&config.target_url)
        .await
        .context("Failed to connect to target database")?;
    tracing::info!("✓ Connected to target");

    tracing::info!("Checking tables exist...");
    let missing_source = catalog::missing_tables(&source_client, &config.tables).await?;
    let missing_target = catalog::missing_tables(&target_client, &config.tables).await?;
    if !missing_source.is_empty() || !missing_target.is_empty() {
        bail!(
            "Configured tables are missing.\n\
             Missing on source: {}\n\
             Missing on target: {}\n\
             The target schema must be created before copying rows.",
            join_or_none(&missing_source),
            join_or_none(&missing_target)
        );
    }
    tracing::info!("✓ All {} tables exist on both sides", config.tables.len());

    tracing::info!("Checking dependency order against target foreign keys...");
    let qualified = catalog::qualify_tables(&target_client, &config.tables).await?;
    let edges = catalog::list_foreign_keys(&target_client).await?;
    let violations = migration::find_order_violations(&qualified, &edges);
    if !violations.is_empty() {
        let details: Vec<String> = violations.iter().map(|v| format!("  - {}", v)).collect();
        bail!(
            "Table order would violate foreign keys:\n{}\n\
             List parent tables before the tables that reference them.",
            details.join("\n")
        );
    }
    tracing::info!("✓ Table order respects foreign keys");

    tracing::info!("✅ Validation complete - ready to migrate");
    Ok(())
}

fn join_or_none(tables: &[TableName]) -> String {
    if tables.is_empty() {
        return "(none)".to_string();
    }
    tables
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
