//! Storage traits and error types
//!
//! This module defines the trait interface for link storage backends and
//! associated error types.

use crate::crawler::Link;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("failed to create schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to begin transaction: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("failed to insert link: {0}")]
    Insert(#[source] rusqlite::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] rusqlite::Error),

    #[error("failed to query links: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("database connection poisoned by a panicked writer")]
    Poisoned,

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable destination for extracted links
///
/// Implementations are shared by every worker and must be safe to call
/// concurrently.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Creates the schema if it does not exist yet; idempotent
    async fn ensure_schema(&self) -> StorageResult<()>;

    /// Records all `links` for `url`, or none of them
    async fn store_links(&self, url: &str, links: &[Link]) -> StorageResult<()>;
}
