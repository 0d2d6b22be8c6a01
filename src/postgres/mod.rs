// ABOUTME: PostgreSQL plumbing shared by the migrate and validate commands
// ABOUTME: Connection setup, catalog queries, and the row source and sink implementations

pub mod catalog;
pub mod connection;
pub mod reader;
pub mod value;
pub mod writer;

pub use connection::connect;
pub use reader::PostgresSource;
pub use value::PassthroughValue;
pub use writer::PostgresSink;
