//! Storage module for persisting extracted links
//!
//! This module handles all database operations for the scraper, including:
//! - SQLite database initialization and schema management
//! - Atomic per-URL link insertion
//! - Read helpers used by the `--stats` mode and tests

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, schema_version, SCHEMA_VERSION};
pub use sqlite::SqliteLinkStore;
pub use traits::{LinkStore, StorageError, StorageResult};

use std::path::Path;

/// Opens a link store and makes sure its schema exists
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteLinkStore)` - Store ready for inserts
/// * `Err(StorageError)` - The database could not be opened or the schema created
pub async fn open_store(path: &Path) -> StorageResult<SqliteLinkStore> {
    let store = SqliteLinkStore::open(path)?;
    store.ensure_schema().await?;
    Ok(store)
}
