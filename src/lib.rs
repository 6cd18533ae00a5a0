//! Busca - Hybrid Retrieval Engine
//!
//! Combines vector-similarity search over indexed content with lexical
//! keyword scoring, fuses and deduplicates the two candidate sets, applies
//! caller filters, ranks the union, and caches ranked results for a bounded
//! time window.

pub mod config;
pub mod embedding;
pub mod error;
pub mod search;
pub mod storage;
pub mod types;

pub use error::{Result, SearchError};
pub use search::{SearchEngine, SearchResponse, SearchStats};
pub use types::{ContentType, IndexedItem, SearchFilter, SearchMode, SearchQuery, SearchResult};
