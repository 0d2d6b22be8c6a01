// ABOUTME: Outcome of a copy run, per table and in total
// ABOUTME: Separates rows attempted from rows that actually reached the destination

use crate::migration::TableName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based position of the row in source read order
    pub row_index: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: TableName,
    pub attempted: usize,
    pub failures: Vec<RowFailure>,
}

impl TableReport {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            attempted: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub tables: Vec<TableReport>,
}

impl MigrationReport {
    pub fn attempted(&self) -> usize {
        self.tables.iter().map(|t| t.attempted).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.tables.iter().map(|t| t.succeeded()).sum()
    }

    pub fn failed(&self) -> usize {
        self.tables.iter().map(|t| t.failed()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.tables.iter().all(TableReport::is_complete)
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table.to_string() == name)
    }

    /// Tables with at least one failed row
    pub fn tables_with_failures(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.is_complete())
    }
}
