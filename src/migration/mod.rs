// ABOUTME: Table-by-table copy of rows from the source to the destination
// ABOUTME: Holds table naming, dependency order checks, the copy loop, and its report

pub mod copier;
pub mod order;
pub mod report;
pub mod table;

pub use copier::{migrate_table, migrate_tables, RowSink, RowSource, TableData, TableStart};
pub use order::{find_order_violations, OrderViolation};
pub use report::{MigrationReport, RowFailure, TableReport};
pub use table::{default_tables, parse_table_list, TableName, DEFAULT_TABLES};
