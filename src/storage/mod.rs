mod memory;
mod port;
mod sqlite;

pub use memory::*;
pub use port::*;
pub use sqlite::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
