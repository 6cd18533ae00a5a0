//! Query gateway orchestrating the search pipeline
//!
//! Per-call flow: validate filter, check the cache, dispatch on mode, fuse
//! (hybrid only), filter and paginate, write through the cache, return.
//! Embedding-provider failure never fails a call: Semantic and Hybrid
//! degrade to keyword-only scoring and the response carries a `degraded`
//! flag. Repository read failure is fatal for the call; no partial results
//! are returned.

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::search::cache::ResultCache;
use crate::search::filters;
use crate::search::fusion::{self, FusionConfig};
use crate::search::keywords::KeywordExtractor;
use crate::search::lexical;
use crate::search::safety::RawQueryGuard;
use crate::search::vector;
use crate::storage::ContentRepository;
use crate::types::{
    ContentType, IndexedItem, SearchFilter, SearchMode, SearchQuery, SearchResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Response for one search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub search_type: SearchMode,
    pub total_results: usize,
    /// Set when the embedding provider failed and semantic scoring was
    /// skipped in favor of keyword-only results
    pub degraded: bool,
    pub results: Vec<SearchResult>,
}

/// Aggregate statistics over the search subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    /// Indexed item counts keyed by content-type wire string
    pub counts: BTreeMap<String, u64>,
    pub cache_entries: usize,
    pub last_index_refresh: Option<DateTime<Utc>>,
}

/// Hybrid search engine
///
/// Owns the result cache and borrows the repository and embedding provider.
/// One instance serves concurrent calls; the cache is the only state
/// mutated across them.
pub struct SearchEngine {
    repository: Arc<dyn ContentRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    extractor: KeywordExtractor,
    guard: RawQueryGuard,
    cache: ResultCache,
    fusion: FusionConfig,
    excerpt_chars: usize,
    provider_timeout: Duration,
    last_index_refresh: Mutex<Option<DateTime<Utc>>>,
}

impl SearchEngine {
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        provider: Arc<dyn EmbeddingProvider>,
        config: &Config,
    ) -> Self {
        info!(
            model = provider.model_name(),
            dimension = provider.dimension(),
            cache_ttl_ms = config.cache.ttl_ms,
            "search engine initialized"
        );

        Self {
            repository,
            provider,
            extractor: KeywordExtractor::new(),
            guard: RawQueryGuard::new(),
            cache: ResultCache::new(Duration::from_millis(config.cache.ttl_ms)),
            fusion: FusionConfig {
                semantic_boost: config.ranking.semantic_boost,
                combined_boost: config.ranking.combined_boost,
            },
            excerpt_chars: config.results.excerpt_chars,
            provider_timeout: Duration::from_millis(config.provider.timeout_ms),
            last_index_refresh: Mutex::new(None),
        }
    }

    /// Resolve one search call
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let filter = query.filter.validated()?;
        let text = query.text.trim();

        if text.is_empty() {
            return Ok(SearchResponse {
                query: query.text.clone(),
                search_type: query.mode,
                total_results: 0,
                degraded: false,
                results: Vec::new(),
            });
        }

        // Raw-query mode bypasses fusion and the cache: its rows reflect
        // live structured data
        if query.mode == SearchMode::RawQuery {
            return self.raw_search(text, &filter);
        }

        let cache_key = ResultCache::key(text, query.mode, &filter)?;
        if let Some(results) = self.cache.get(&cache_key) {
            debug!(query = text, mode = query.mode.as_str(), "cache hit");
            return Ok(SearchResponse {
                query: text.to_string(),
                search_type: query.mode,
                total_results: results.len(),
                degraded: false,
                results,
            });
        }

        // Fail closed on repository errors: no partial results
        let snapshot = self.repository.fetch_all()?;

        let mut degraded = false;
        let mut results = match query.mode {
            SearchMode::Semantic => match self.semantic_candidates(text, &filter, &snapshot).await
            {
                Ok(candidates) => candidates,
                Err(SearchError::ProviderUnavailable(reason)) => {
                    warn!(query = text, reason = %reason, "semantic search degraded to keyword");
                    degraded = true;
                    self.keyword_candidates(text, &snapshot)
                }
                Err(e) => return Err(e),
            },
            SearchMode::Keyword => self.keyword_candidates(text, &snapshot),
            SearchMode::Hybrid => {
                let keyword = self.keyword_candidates(text, &snapshot);
                match self.semantic_candidates(text, &filter, &snapshot).await {
                    Ok(semantic) => fusion::fuse(semantic, keyword, &self.fusion),
                    Err(SearchError::ProviderUnavailable(reason)) => {
                        warn!(query = text, reason = %reason, "hybrid search degraded to keyword");
                        degraded = true;
                        keyword
                    }
                    Err(e) => return Err(e),
                }
            }
            SearchMode::RawQuery => unreachable!("handled before the cache check"),
        };

        if query.mode != SearchMode::Hybrid {
            // Fusion already ranked the hybrid list
            fusion::rank(&mut results);
        }

        let results = filters::apply(results, &filter);

        // Degraded results are not cached: once the provider recovers, the
        // next identical query should get semantic scoring back immediately
        if !degraded {
            self.cache.put(cache_key, results.clone());
        }

        info!(
            query = text,
            mode = query.mode.as_str(),
            total = results.len(),
            degraded,
            "search completed"
        );

        Ok(SearchResponse {
            query: text.to_string(),
            search_type: query.mode,
            total_results: results.len(),
            degraded,
            results,
        })
    }

    /// Autocomplete suggestions from distinct stored titles and distinct
    /// previously executed raw-query texts
    pub fn suggestions(&self, partial: &str, limit: usize) -> Result<Vec<String>> {
        let partial = partial.trim();
        if partial.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let per_source = (limit / 2).max(1);
        let mut suggestions = self.repository.title_suggestions(partial, per_source)?;
        suggestions.extend(self.repository.query_suggestions(partial, per_source)?);

        suggestions.sort();
        suggestions.dedup();
        suggestions.sort_by_key(|s| s.chars().count());
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    /// Aggregate index and cache statistics
    pub fn stats(&self) -> Result<SearchStats> {
        let mut counts = BTreeMap::new();
        for content_type in ContentType::ALL {
            counts.insert(
                content_type.as_str().to_string(),
                self.repository.count_by_type(content_type)?,
            );
        }

        Ok(SearchStats {
            counts,
            cache_entries: self.cache.len(),
            last_index_refresh: *self.last_index_refresh.lock().unwrap(),
        })
    }

    /// Sole ingestion path for new indexed items
    ///
    /// Embedding is best-effort: if the provider is unavailable the item is
    /// stored without a vector and only reachable through keyword search.
    pub async fn add_to_index(
        &self,
        content_type: ContentType,
        title: &str,
        content: &str,
        source: Option<String>,
        category: Option<String>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<String> {
        let embedding = match self.embed_with_timeout(content).await {
            Ok(vector) => Some(vector),
            Err(SearchError::ProviderUnavailable(reason)) => {
                warn!(title, reason = %reason, "indexing without embedding");
                None
            }
            Err(e) => return Err(e),
        };

        let item = IndexedItem {
            id: Uuid::new_v4().to_string(),
            content_type,
            title: title.to_string(),
            content: content.to_string(),
            embedding,
            source,
            category,
            created_at: Utc::now(),
            metadata: metadata.unwrap_or_default(),
        };

        self.repository.store(&item)?;
        *self.last_index_refresh.lock().unwrap() = Some(item.created_at);

        info!(
            id = %item.id,
            content_type = content_type.as_str(),
            "item added to index"
        );
        Ok(item.id)
    }

    fn raw_search(&self, sql: &str, filter: &SearchFilter) -> Result<SearchResponse> {
        self.guard.check(sql).inspect_err(|_| {
            warn!(query = sql, "unsafe raw query rejected");
        })?;

        let rows = self.repository.raw_query(sql)?;
        let executed_at = Utc::now();

        let results: Vec<SearchResult> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let content = row
                    .iter()
                    .map(|(column, value)| format!("{}: {}", column, value))
                    .collect::<Vec<_>>()
                    .join(" | ");

                SearchResult {
                    id: format!("raw-{}", i + 1),
                    title: format!("Query result {}", i + 1),
                    content,
                    content_type: ContentType::QueryResult,
                    similarity: 1.0,
                    source: Some("raw_query".to_string()),
                    category: None,
                    timestamp: Some(executed_at),
                    metadata: HashMap::from([(
                        "original_query".to_string(),
                        Value::String(sql.to_string()),
                    )]),
                }
            })
            .collect();

        let results = filters::apply(results, filter);

        info!(query = sql, total = results.len(), "raw query completed");
        Ok(SearchResponse {
            query: sql.to_string(),
            search_type: SearchMode::RawQuery,
            total_results: results.len(),
            degraded: false,
            results,
        })
    }

    async fn semantic_candidates(
        &self,
        text: &str,
        filter: &SearchFilter,
        snapshot: &[IndexedItem],
    ) -> Result<Vec<SearchResult>> {
        let query_vector = self.embed_with_timeout(text).await?;

        Ok(
            vector::similarity_scan(&query_vector, snapshot, filter.min_similarity)
                .into_iter()
                .map(|(item, score)| self.to_result(item, score))
                .collect(),
        )
    }

    fn keyword_candidates(&self, text: &str, snapshot: &[IndexedItem]) -> Vec<SearchResult> {
        let tokens = self.extractor.extract(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        snapshot
            .iter()
            .filter_map(|item| {
                let haystack = format!("{}\n{}", item.title, item.content);
                let score = lexical::keyword_score(&haystack, &tokens);
                (score > 0.0).then(|| self.to_result(item, score))
            })
            .collect()
    }

    /// Vectorize the query under the configured timeout
    ///
    /// The provider call is the only blocking external I/O in the hot path,
    /// so it runs on the blocking pool.
    async fn embed_with_timeout(&self, text: &str) -> Result<Vec<f32>> {
        let provider = Arc::clone(&self.provider);
        let owned = text.to_string();
        let task = tokio::task::spawn_blocking(move || provider.embed(&owned));

        match tokio::time::timeout(self.provider_timeout, task).await {
            Ok(Ok(Ok(vector))) => Ok(vector),
            Ok(Ok(Err(e))) => Err(SearchError::ProviderUnavailable(e.to_string())),
            Ok(Err(join_error)) => Err(SearchError::ProviderUnavailable(join_error.to_string())),
            Err(_) => Err(SearchError::ProviderUnavailable(format!(
                "timed out after {} ms",
                self.provider_timeout.as_millis()
            ))),
        }
    }

    fn to_result(&self, item: &IndexedItem, similarity: f32) -> SearchResult {
        SearchResult {
            id: item.id.clone(),
            title: item.title.clone(),
            content: excerpt(&item.content, self.excerpt_chars),
            content_type: item.content_type,
            similarity,
            source: item.source.clone(),
            category: item.category.clone(),
            timestamp: Some(item.created_at),
            metadata: item.metadata.clone(),
        }
    }
}

fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
