/// Embedding provider trait
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding generation failed: {0}")]
    Generation(String),

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding providers
///
/// Turns text into a fixed-length numeric vector. Every call is fallible,
/// possibly slow, I/O; the gateway wraps calls in a bounded timeout and
/// degrades to keyword-only scoring when the provider is unavailable.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embedding dimension produced by this provider
    fn dimension(&self) -> usize;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
