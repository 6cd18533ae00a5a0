//! TTL-bounded result cache
//!
//! Memoizes (query, mode, filter) -> ranked results. Expiry is lazy: an
//! expired entry is treated as absent on read and silently overwritten by
//! the next write. No background eviction runs; a `put` for an existing
//! key always wins regardless of the old entry's remaining TTL.

use crate::error::{Result, SearchError};
use crate::types::{SearchFilter, SearchMode, SearchResult};
use ahash::AHashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    created_at: Instant,
    results: Vec<SearchResult>,
}

/// Mutex-guarded TTL cache for ranked result lists
///
/// Safe under concurrent calls; duplicate recomputation for the same key
/// on a miss race is acceptable and last writer wins.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<AHashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    /// Cache key as a pure function of query text, mode, and filter
    /// contents, so identical queries always hit the same slot
    pub fn key(query: &str, mode: SearchMode, filter: &SearchFilter) -> Result<String> {
        let filter_bytes = serde_json::to_vec(filter).map_err(|source| SearchError::Json {
            source,
            context: "serializing filter for cache key".to_string(),
        })?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(query.as_bytes());
        hasher.update(mode.as_str().as_bytes());
        hasher.update(&filter_bytes);
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Fetch a fresh entry; expired entries are treated as absent
    pub fn get(&self, key: &str) -> Option<Vec<SearchResult>> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| entry.results.clone())
    }

    /// Store results, overwriting any existing entry for the key
    pub fn put(&self, key: String, results: Vec<SearchResult>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            CacheEntry {
                created_at: Instant::now(),
                results,
            },
        );
    }

    /// Number of entries currently held, stale ones included
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentType;
    use std::collections::HashMap;

    fn result(id: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            content_type: ContentType::Document,
            similarity: 1.0,
            source: None,
            category: None,
            timestamp: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_put_and_get() {
        let cache = ResultCache::new(Duration::from_secs(300));
        cache.put("k".to_string(), vec![result("a")]);

        let hit = cache.get("k").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, "a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = ResultCache::new(Duration::from_secs(300));
        assert!(cache.get("unknown").is_none());
    }

    #[test]
    fn test_expired_entry_treated_as_absent() {
        let cache = ResultCache::new(Duration::from_millis(30));
        cache.put("k".to_string(), vec![result("a")]);

        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get("k").is_none());
        // Entry is still held until overwritten; eviction is lazy
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_freshest_write_wins() {
        let cache = ResultCache::new(Duration::from_secs(300));
        cache.put("k".to_string(), vec![result("old")]);
        cache.put("k".to_string(), vec![result("new")]);

        let hit = cache.get("k").unwrap();
        assert_eq!(hit[0].id, "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_is_pure_function_of_inputs() {
        let filter = SearchFilter::default();
        let a = ResultCache::key("query", SearchMode::Hybrid, &filter).unwrap();
        let b = ResultCache::key("query", SearchMode::Hybrid, &filter).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_varies_with_each_component() {
        let filter = SearchFilter::default();
        let base = ResultCache::key("query", SearchMode::Hybrid, &filter).unwrap();

        let other_text = ResultCache::key("other", SearchMode::Hybrid, &filter).unwrap();
        let other_mode = ResultCache::key("query", SearchMode::Keyword, &filter).unwrap();
        let other_filter = ResultCache::key(
            "query",
            SearchMode::Hybrid,
            &SearchFilter {
                max_results: 5,
                ..Default::default()
            },
        )
        .unwrap();

        assert_ne!(base, other_text);
        assert_ne!(base, other_mode);
        assert_ne!(base, other_filter);
    }
}
