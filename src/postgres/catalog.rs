// ABOUTME: Catalog queries used during pre-flight checks
// ABOUTME: Lists foreign key edges and confirms that configured tables exist

use crate::migration::TableName;
use anyhow::{Context, Result};
use tokio_postgres::Client;

/// A foreign key from `child` to `parent`, both schema-qualified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub child: TableName,
    pub parent: TableName,
    pub constraint: String,
}

/// List every foreign key constraint in the connected database
pub async fn list_foreign_keys(client: &Client) -> Result<Vec<ForeignKeyEdge>> {
    let rows = client
        .query(
            "SELECT
                child_ns.nspname,
                child.relname,
                parent_ns.nspname,
                parent.relname,
                con.conname
             FROM pg_catalog.pg_constraint con
             JOIN pg_catalog.pg_class child ON child.oid = con.conrelid
             JOIN pg_catalog.pg_namespace child_ns ON child_ns.oid = child.relnamespace
             JOIN pg_catalog.pg_class parent ON parent.oid = con.confrelid
             JOIN pg_catalog.pg_namespace parent_ns ON parent_ns.oid = parent.relnamespace
             WHERE con.contype = 'f'
               AND child_ns.nspname NOT IN ('pg_catalog', 'information_schema')
             ORDER BY con.conname",
            &[],
        )
        .await
        .context("Failed to list foreign keys")?;

    let edges = rows
        .iter()
        .map(|row| ForeignKeyEdge {
            child: TableName::qualified(row.get::<_, String>(0), row.get::<_, String>(1)),
            parent: TableName::qualified(row.get::<_, String>(2), row.get::<_, String>(3)),
            constraint: row.get(4),
        })
        .collect();

    Ok(edges)
}

/// Resolve a table name the way the server would for `SELECT * FROM name`
///
/// Returns the schema the table lives in, or `None` if it does not exist on
/// the current search path.
pub async fn resolve_table_schema(client: &Client, table: &TableName) -> Result<Option<String>> {
    let row = client
        .query_opt(
            "SELECT n.nspname
             FROM pg_catalog.pg_class c
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
             WHERE c.oid = to_regclass($1)",
            &[&table.quoted()],
        )
        .await
        .with_context(|| format!("Failed to look up table '{}'", table))?;

    Ok(row.map(|row| row.get(0)))
}

/// Return the tables from `tables` that do not exist in the connected database
pub async fn missing_tables(client: &Client, tables: &[TableName]) -> Result<Vec<TableName>> {
    let mut missing = Vec::new();
    for table in tables {
        if resolve_table_schema(client, table).await?.is_none() {
            missing.push(table.clone());
        }
    }
    Ok(missing)
}

/// Fill in the schema of unqualified table names from the connected database
///
/// Tables that cannot be found are returned unchanged.
pub async fn qualify_tables(client: &Client, tables: &[TableName]) -> Result<Vec<TableName>> {
    let mut qualified = Vec::with_capacity(tables.len());
    for table in tables {
        let resolved = match (&table.schema, resolve_table_schema(client, table).await?) {
            (None, Some(schema)) => TableName::qualified(schema, table.name.clone()),
            _ => table.clone(),
        };
        qualified.push(resolved);
    }
    Ok(qualified)
}
