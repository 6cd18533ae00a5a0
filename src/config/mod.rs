//! Configuration for the search engine
//!
//! All tunables carry serde defaults so a partial TOML file (or none at all)
//! yields a working configuration.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub results: ResultsConfig,
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached result lists, in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_ttl_ms() -> u64 {
    300_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

/// Embedding provider call configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bound on a single vectorization call, in milliseconds; on timeout
    /// the call degrades to keyword-only scoring
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    2_000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Fusion scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Multiplier applied to semantic scores before merging, capped at 1.0
    #[serde(default = "default_semantic_boost")]
    pub semantic_boost: f32,

    /// Multiplier applied to the averaged score of dual-signal hits,
    /// capped at 1.0
    #[serde(default = "default_combined_boost")]
    pub combined_boost: f32,
}

fn default_semantic_boost() -> f32 {
    1.2
}

fn default_combined_boost() -> f32 {
    1.1
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            semantic_boost: default_semantic_boost(),
            combined_boost: default_combined_boost(),
        }
    }
}

/// Result shaping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Maximum characters kept in a result excerpt
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_excerpt_chars() -> usize {
    280
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| SearchError::Io {
            source,
            context: format!("reading config file {}", path.display()),
        })?;

        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_ms == 0 {
            return Err(SearchError::InvalidConfigValue {
                path: "cache.ttl_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.provider.timeout_ms == 0 {
            return Err(SearchError::InvalidConfigValue {
                path: "provider.timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for (path, value) in [
            ("ranking.semantic_boost", self.ranking.semantic_boost),
            ("ranking.combined_boost", self.ranking.combined_boost),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(SearchError::InvalidConfigValue {
                    path: path.to_string(),
                    message: "must be a finite number >= 1.0".to_string(),
                });
            }
        }

        if self.results.excerpt_chars == 0 {
            return Err(SearchError::InvalidConfigValue {
                path: "results.excerpt_chars".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
