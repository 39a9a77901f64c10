//! Store client implementations

pub mod sqlite;

pub use sqlite::SqliteStore;
