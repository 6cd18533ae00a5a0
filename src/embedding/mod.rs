//! Embedding provider boundary
//!
//! The provider itself is an external service; this module only defines the
//! call contract the search core depends on.

mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider};
