use thiserror::Error;

/// Main error type for search operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// Embedding vectorization failed or timed out; semantic scoring was
    /// skipped and the call degraded to keyword-only where possible
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Malformed filter value, rejected before any I/O
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Search mode string not recognized at the gateway boundary
    #[error("Unknown search mode: {0}")]
    UnknownMode(String),

    /// Raw-query request containing a mutating keyword, never executed
    #[error("Unsafe raw query rejected: {0}")]
    UnsafeRawQuery(String),

    /// Content snapshot could not be fetched; fatal for the call
    #[error("Repository error: {0}")]
    Repository(#[from] crate::storage::RepositoryError),

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
