//! Content repository boundary
//!
//! The repository owns `IndexedItem` durably; the search core only reads
//! materialized snapshots per call. Concurrent writes during a scan are
//! invisible until the next call.

mod memory;
mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use crate::types::{ContentType, IndexedItem};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Stored value for column {column} is invalid: {value}")]
    InvalidColumn { column: String, value: String },

    #[error("Serialization error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A raw-query row as ordered (column, rendered value) pairs
pub type Row = Vec<(String, String)>;

/// Durable storage for indexed items
///
/// `fetch_all` returns a snapshot of all active items; `raw_query` executes
/// an already-vetted read-only expression and logs its text for later
/// suggestion lookups.
pub trait ContentRepository: Send + Sync {
    /// Fetch a snapshot of all active items
    fn fetch_all(&self) -> Result<Vec<IndexedItem>, RepositoryError>;

    /// Insert or replace an item
    fn store(&self, item: &IndexedItem) -> Result<(), RepositoryError>;

    /// Execute a read-only retrieval expression and return its rows
    fn raw_query(&self, sql: &str) -> Result<Vec<Row>, RepositoryError>;

    /// Distinct stored titles containing the fragment (case-insensitive)
    fn title_suggestions(&self, fragment: &str, limit: usize)
        -> Result<Vec<String>, RepositoryError>;

    /// Distinct previously executed raw-query texts containing the fragment
    fn query_suggestions(&self, fragment: &str, limit: usize)
        -> Result<Vec<String>, RepositoryError>;

    /// Number of active items with the given content type
    fn count_by_type(&self, content_type: ContentType) -> Result<u64, RepositoryError>;
}
