// ABOUTME: Row-by-row table copy loop driving a row source and a row sink
// ABOUTME: Skips rows the destination rejects and commits once per table

use crate::migration::report::{MigrationReport, RowFailure, TableReport};
use crate::migration::TableName;
use crate::postgres::PassthroughValue;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;

/// All rows of one table, in read order, with the column names they carry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<PassthroughValue>>,
}

#[async_trait]
pub trait RowSource: Send {
    async fn read_table(&mut self, table: &TableName) -> Result<TableData>;
}

/// Whether the destination can take rows for a table at all
#[derive(Debug)]
pub enum TableStart {
    Ready,
    /// The insert itself was refused (for example a source column the
    /// destination lacks). The sink has already rolled back, and every row
    /// of the table fails with this error.
    Rejected(anyhow::Error),
}

/// Destination side of the copy
///
/// `begin_table` opens the table's transaction, `insert_row` is called once
/// per source row, and `commit_table` commits whatever was inserted. An
/// error from `insert_row` must leave the sink ready for the next row.
/// After `TableStart::Rejected`, neither `insert_row` nor `commit_table` is
/// called for that table.
#[async_trait]
pub trait RowSink: Send {
    async fn begin_table(&mut self, table: &TableName, columns: &[String]) -> Result<TableStart>;
    async fn insert_row(&mut self, row: &[PassthroughValue]) -> Result<()>;
    async fn commit_table(&mut self) -> Result<()>;
}

/// Copy a single table
///
/// Rejected rows are written to `out` as `Error inserting into {table}: {error}`
/// and recorded in the returned report. When the destination refuses the
/// table's insert outright, each row is reported with that refusal and the
/// run moves on. Reading the source, opening the destination transaction,
/// or committing it are the only fatal failures.
pub async fn migrate_table<S, D, W>(
    source: &mut S,
    sink: &mut D,
    table: &TableName,
    out: &mut W,
) -> Result<TableReport>
where
    S: RowSource + ?Sized,
    D: RowSink + ?Sized,
    W: Write + Send,
{
    writeln!(out, "Migrating {}...", table)?;

    let data = source
        .read_table(table)
        .await
        .with_context(|| format!("Failed to read table '{}' from source", table))?;
    tracing::debug!(
        "Read {} rows from '{}' with columns {:?}",
        data.rows.len(),
        table,
        data.columns
    );

    let start = sink
        .begin_table(table, &data.columns)
        .await
        .with_context(|| format!("Failed to open destination transaction for table '{}'", table))?;

    let mut report = TableReport::new(table.clone());
    match start {
        TableStart::Ready => {
            for (row_index, row) in data.rows.iter().enumerate() {
                report.attempted += 1;
                if let Err(e) = sink.insert_row(row).await {
                    record_failure(out, &mut report, row_index, format!("{:#}", e))?;
                }
            }

            sink.commit_table()
                .await
                .with_context(|| format!("Failed to commit table '{}'", table))?;
        }
        TableStart::Rejected(reason) => {
            let message = format!("{:#}", reason);
            tracing::warn!("Destination refused inserts into '{}': {}", table, message);
            for row_index in 0..data.rows.len() {
                report.attempted += 1;
                record_failure(out, &mut report, row_index, message.clone())?;
            }
        }
    }

    writeln!(out, "✓ {}: {} records migrated", table, report.attempted)?;
    if report.is_complete() {
        tracing::info!("Copied {} rows into '{}'", report.succeeded(), table);
    } else {
        tracing::warn!(
            "⚠ Only {} of {} rows reached '{}'",
            report.succeeded(),
            report.attempted,
            table
        );
    }

    Ok(report)
}

fn record_failure<W: Write>(
    out: &mut W,
    report: &mut TableReport,
    row_index: usize,
    message: String,
) -> Result<()> {
    writeln!(out, "Error inserting into {}: {}", report.table, message)?;
    tracing::debug!("Row {} of '{}' rejected", row_index, report.table);
    report.failures.push(RowFailure { row_index, message });
    Ok(())
}

/// Copy every table in the given order
///
/// Tables are processed strictly one after another. A fatal error stops the
/// run; tables committed before it stay committed.
pub async fn migrate_tables<S, D, W>(
    source: &mut S,
    sink: &mut D,
    tables: &[TableName],
    out: &mut W,
) -> Result<MigrationReport>
where
    S: RowSource + ?Sized,
    D: RowSink + ?Sized,
    W: Write + Send,
{
    let mut report = MigrationReport::default();

    for table in tables {
        let table_report = migrate_table(source, sink, table, out).await?;
        report.tables.push(table_report);
    }

    writeln!(out, "✓ Migration complete")?;
    if !report.is_complete() {
        writeln!(
            out,
            "⚠ {} of {} rows failed across {} table(s)",
            report.failed(),
            report.attempted(),
            report.tables_with_failures().count()
        )?;
    }
    out.flush()?;

    Ok(report)
}
