// ABOUTME: Command implementations invoked by the CLI
// ABOUTME: Exports the migrate and validate commands

pub mod migrate;
pub mod validate;

pub use migrate::migrate;
pub use validate::validate;
