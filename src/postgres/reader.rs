// ABOUTME: Reads whole tables from the source database as passthrough rows
// ABOUTME: Column names come from the prepared SELECT's result metadata

use crate::migration::{RowSource, TableData, TableName};
use crate::postgres::PassthroughValue;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio_postgres::Client;

pub struct PostgresSource {
    client: Client,
}

impl PostgresSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Read every row of `table` in server order
///
/// All rows are buffered in memory before returning.
pub async fn read_table_data(client: &Client, table: &TableName) -> Result<TableData> {
    let query = format!("SELECT * FROM {}", table.quoted());
    tracing::debug!("Source query: {}", query);

    let statement = client
        .prepare(&query)
        .await
        .with_context(|| format!("Failed to prepare SELECT for table '{}'", table))?;

    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let rows = client
        .query(&statement, &[])
        .await
        .with_context(|| format!("Failed to query rows from table '{}'", table))?;

    let rows = rows
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|idx| row.try_get::<_, PassthroughValue>(idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read row values from table '{}'", table))?;

    tracing::info!("Read {} rows from table '{}'", rows.len(), table);

    Ok(TableData { columns, rows })
}

#[async_trait]
impl RowSource for PostgresSource {
    async fn read_table(&mut self, table: &TableName) -> Result<TableData> {
        read_table_data(&self.client, table).await
    }
}
