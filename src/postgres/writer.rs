// ABOUTME: Inserts passthrough rows into the destination database one at a time
// ABOUTME: One transaction per table, one savepoint per row so rejected rows are skipped

use crate::migration::{RowSink, TableName, TableStart};
use crate::postgres::PassthroughValue;
use crate::utils::{error_chain, quote_ident};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Statement};

const ROW_SAVEPOINT: &str = "copy_row";

/// Build the INSERT for one row of `table`
///
/// Identifiers are quoted; values are bound as `$1..$n`. A table without
/// columns gets `DEFAULT VALUES`.
///
/// ```
/// # use pg_table_copier::migration::TableName;
/// # use pg_table_copier::postgres::writer::build_insert_sql;
/// let table = TableName::parse("personas").unwrap();
/// let sql = build_insert_sql(&table, &["id".to_string(), "nombre".to_string()]);
/// assert_eq!(sql, r#"INSERT INTO "personas" ("id", "nombre") VALUES ($1, $2)"#);
/// ```
pub fn build_insert_sql(table: &TableName, columns: &[String]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", table.quoted());
    }

    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.quoted(),
        column_list,
        placeholders
    )
}

/// Render a driver error as a single line, preferring the server's message
///
/// Client-side failures carry their reason as the error's cause, for example
/// the type mismatch behind `error serializing parameter N`.
fn describe_error(error: &tokio_postgres::Error) -> anyhow::Error {
    match error.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => anyhow!("{} ({})", db.message(), detail),
            None => anyhow!("{}", db.message()),
        },
        None => anyhow!(error_chain(error)),
    }
}

pub struct PostgresSink {
    client: Client,
    insert: Option<Statement>,
}

impl PostgresSink {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            insert: None,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RowSink for PostgresSink {
    async fn begin_table(&mut self, table: &TableName, columns: &[String]) -> Result<TableStart> {
        let sql = build_insert_sql(table, columns);
        tracing::debug!("Destination insert: {}", sql);

        self.client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| describe_error(&e))
            .context("Failed to begin destination transaction")?;

        match self.client.prepare(&sql).await {
            Ok(statement) => {
                self.insert = Some(statement);
                Ok(TableStart::Ready)
            }
            Err(e) => {
                // The failed PREPARE aborted the transaction, so nothing can be salvaged
                self.client
                    .batch_execute("ROLLBACK")
                    .await
                    .map_err(|rollback| describe_error(&rollback))
                    .context("Failed to roll back destination transaction")?;
                Ok(TableStart::Rejected(describe_error(&e)))
            }
        }
    }

    async fn insert_row(&mut self, row: &[PassthroughValue]) -> Result<()> {
        let statement = self
            .insert
            .as_ref()
            .ok_or_else(|| anyhow!("insert_row called before begin_table"))?;
        let params: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        self.client
            .batch_execute(&format!("SAVEPOINT {}", ROW_SAVEPOINT))
            .await
            .map_err(|e| describe_error(&e))?;

        match self.client.execute(statement, &params).await {
            Ok(_) => {
                self.client
                    .batch_execute(&format!("RELEASE SAVEPOINT {}", ROW_SAVEPOINT))
                    .await
                    .map_err(|e| describe_error(&e))?;
                Ok(())
            }
            Err(e) => {
                self.client
                    .batch_execute(&format!("ROLLBACK TO SAVEPOINT {}", ROW_SAVEPOINT))
                    .await
                    .map_err(|rollback| describe_error(&rollback))
                    .context("Failed to roll back rejected row")?;
                Err(describe_error(&e))
            }
        }
    }

    async fn commit_table(&mut self) -> Result<()> {
        self.insert = None;
        self.client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| describe_error(&e))
            .context("Failed to commit destination transaction")
    }
}
