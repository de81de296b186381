//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LinkStore trait.

use crate::crawler::Link;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite link store
///
/// Cloning is cheap and every clone shares the same connection, so a single
/// store can be handed to every worker. Each [`LinkStore::store_links`] call
/// runs in its own transaction on a blocking thread.
#[derive(Clone)]
pub struct SqliteLinkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLinkStore {
    /// Opens (or creates) the database at `path`
    ///
    /// The schema is not created here; call [`LinkStore::ensure_schema`].
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(StorageError::Open)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
        ",
        )
        .map_err(StorageError::Open)?;

        Ok(Self::from_connection(conn))
    }

    /// Wraps an already configured connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Creates an in-memory database with its schema (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::Open)?;
        initialize_schema(&conn).map_err(StorageError::Schema)?;
        Ok(Self::from_connection(conn))
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Blocking form of [`LinkStore::ensure_schema`]
    pub fn create_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        initialize_schema(&conn).map_err(StorageError::Schema)
    }

    /// Blocking form of [`LinkStore::store_links`]; returns the number of rows written
    pub fn insert_links(&self, url: &str, links: &[Link]) -> StorageResult<usize> {
        let mut conn = self.lock()?;
        insert_links_atomic(&mut conn, url, links)
    }

    /// Counts every stored link
    pub fn count_links(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .map_err(StorageError::Query)?;
        Ok(count as u64)
    }

    /// Counts the links stored for one page
    pub fn count_links_for(&self, url: &str) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM links WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .map_err(StorageError::Query)?;
        Ok(count as u64)
    }

    /// Gets the links stored for one page, in insertion order
    pub fn links_for(&self, url: &str) -> StorageResult<Vec<Link>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT text, href FROM links WHERE url = ?1 ORDER BY id")
            .map_err(StorageError::Query)?;

        let links = stmt
            .query_map(params![url], |row| {
                Ok(Link {
                    text: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    href: row.get(1)?,
                })
            })
            .map_err(StorageError::Query)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Query)?;

        Ok(links)
    }

    /// Gets the number of links per page, busiest first
    pub fn link_counts_by_url(&self) -> StorageResult<Vec<(String, u64)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT url, COUNT(*) AS count FROM links GROUP BY url ORDER BY count DESC, url",
            )
            .map_err(StorageError::Query)?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))
            .map_err(StorageError::Query)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Query)?;

        Ok(counts)
    }
}

/// Inserts every link for `url` in one transaction
///
/// Returning early drops the transaction, which rolls back any row already
/// written for this call.
fn insert_links_atomic(conn: &mut Connection, url: &str, links: &[Link]) -> StorageResult<usize> {
    let tx = conn.transaction().map_err(StorageError::Transaction)?;
    let stored_at = Utc::now().to_rfc3339();

    {
        let mut stmt = tx
            .prepare("INSERT INTO links (url, text, href, stored_at) VALUES (?1, ?2, ?3, ?4)")
            .map_err(StorageError::Insert)?;

        for link in links {
            stmt.execute(params![url, link.text, link.href, stored_at])
                .map_err(StorageError::Insert)?;
        }
    }

    tx.commit().map_err(StorageError::Commit)?;
    Ok(links.len())
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn ensure_schema(&self) -> StorageResult<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.create_schema()).await?
    }

    async fn store_links(&self, url: &str, links: &[Link]) -> StorageResult<()> {
        let store = self.clone();
        let owned_url = url.to_owned();
        let owned_links = links.to_vec();

        let written =
            tokio::task::spawn_blocking(move || store.insert_links(&owned_url, &owned_links))
                .await??;

        tracing::debug!(url, rows = written, "Links committed");
        Ok(())
    }
}
