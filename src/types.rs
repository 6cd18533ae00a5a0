//! Core data model: search modes, content types, filters, items, and results

use crate::error::{Result, SearchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// How a query is resolved against the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Vector-similarity search over item embeddings
    Semantic,
    /// Lexical keyword-frequency scoring
    Keyword,
    /// Restricted read-only pass-through to the repository ("sql" on the wire)
    #[serde(rename = "sql")]
    RawQuery,
    /// Semantic and keyword candidates fused into one ranked list
    Hybrid,
}

impl SearchMode {
    /// Parse a wire-format mode string; `None` for unrecognized values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "semantic" => Some(Self::Semantic),
            "keyword" => Some(Self::Keyword),
            "sql" => Some(Self::RawQuery),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::RawQuery => "sql",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Tag for heterogeneous indexed material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Document,
    Conversation,
    QueryResult,
    TableData,
    LogEntry,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        Self::Document,
        Self::Conversation,
        Self::QueryResult,
        Self::TableData,
        Self::LogEntry,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(Self::Document),
            "conversation" => Some(Self::Conversation),
            "query_result" => Some(Self::QueryResult),
            "table_data" => Some(Self::TableData),
            "log_entry" => Some(Self::LogEntry),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Conversation => "conversation",
            Self::QueryResult => "query_result",
            Self::TableData => "table_data",
            Self::LogEntry => "log_entry",
        }
    }
}

/// Caller-supplied constraints applied to a ranked result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,

    /// Minimum similarity in [0,1]; values outside the range are clamped
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Maximum number of results returned; must be greater than zero
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_similarity() -> f32 {
    0.5
}

fn default_max_results() -> usize {
    20
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            content_type: None,
            category: None,
            source: None,
            date_from: None,
            date_to: None,
            min_similarity: default_min_similarity(),
            max_results: default_max_results(),
        }
    }
}

impl SearchFilter {
    /// Validate and normalize the filter before any I/O
    ///
    /// Rejects `max_results == 0`, non-finite similarity values, and
    /// inverted date ranges; clamps `min_similarity` into [0,1].
    pub fn validated(&self) -> Result<SearchFilter> {
        if self.max_results == 0 {
            return Err(SearchError::InvalidFilter(
                "max_results must be greater than zero".to_string(),
            ));
        }

        if !self.min_similarity.is_finite() {
            return Err(SearchError::InvalidFilter(
                "min_similarity must be a finite number".to_string(),
            ));
        }

        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(SearchError::InvalidFilter(format!(
                    "date_from {} is after date_to {}",
                    from, to
                )));
            }
        }

        let mut filter = self.clone();
        filter.min_similarity = filter.min_similarity.clamp(0.0, 1.0);
        Ok(filter)
    }
}

/// A search request: text, resolution mode, and filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub mode: SearchMode,

    #[serde(default)]
    pub filter: SearchFilter,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            text: text.into(),
            mode,
            filter: SearchFilter::default(),
        }
    }

    /// Build a query from wire-format strings, resolving the mode once at
    /// the gateway boundary
    pub fn from_wire(text: impl Into<String>, mode: &str, filter: SearchFilter) -> Result<Self> {
        let mode = SearchMode::parse(mode).ok_or_else(|| SearchError::UnknownMode(mode.to_string()))?;
        Ok(Self {
            text: text.into(),
            mode,
            filter,
        })
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A record owned by the content repository
///
/// The search core only ever reads snapshots of these; it never mutates
/// stored items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedItem {
    pub id: String,
    pub content_type: ContentType,
    pub title: String,
    pub content: String,

    /// Precomputed embedding; items without one are skipped by the
    /// similarity scan, not scored as zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    pub source: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// One ranked search hit, constructed fresh per query and immutable once
/// built (except transiently inside the result cache)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    /// Content excerpt, truncated at a char boundary
    pub content: String,
    pub content_type: ContentType,
    /// Relevance score in [0,1]
    pub similarity: f32,
    pub source: Option<String>,
    pub category: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}
