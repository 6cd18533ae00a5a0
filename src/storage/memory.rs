//! In-memory repository
//!
//! Snapshot store backed by a `RwLock<Vec<_>>`, with an observable scan
//! counter so tests can assert whether a search hit the cache or re-read
//! the corpus.

use crate::storage::{ContentRepository, RepositoryError, Row};
use crate::types::{ContentType, IndexedItem};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// In-memory `ContentRepository` implementation
#[derive(Default)]
pub struct MemoryRepository {
    items: RwLock<Vec<IndexedItem>>,
    executed_queries: RwLock<Vec<String>>,
    scans: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<IndexedItem>) -> Self {
        Self {
            items: RwLock::new(items),
            executed_queries: RwLock::new(Vec::new()),
            scans: AtomicU64::new(0),
        }
    }

    /// Number of full snapshot reads performed so far
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::SeqCst)
    }
}

impl ContentRepository for MemoryRepository {
    fn fetch_all(&self) -> Result<Vec<IndexedItem>, RepositoryError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.read().unwrap().clone())
    }

    fn store(&self, item: &IndexedItem) -> Result<(), RepositoryError> {
        let mut items = self.items.write().unwrap();
        if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
            *existing = item.clone();
        } else {
            items.push(item.clone());
        }
        Ok(())
    }

    /// Projects the current snapshot as rows; the expression itself is only
    /// recorded, not interpreted
    fn raw_query(&self, sql: &str) -> Result<Vec<Row>, RepositoryError> {
        self.executed_queries.write().unwrap().push(sql.to_string());

        let items = self.items.read().unwrap();
        Ok(items
            .iter()
            .map(|item| {
                vec![
                    ("id".to_string(), item.id.clone()),
                    ("title".to_string(), item.title.clone()),
                    ("content".to_string(), item.content.clone()),
                ]
            })
            .collect())
    }

    fn title_suggestions(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let needle = fragment.to_lowercase();
        let items = self.items.read().unwrap();
        let distinct: BTreeSet<String> = items
            .iter()
            .filter(|i| i.title.to_lowercase().contains(&needle))
            .map(|i| i.title.clone())
            .collect();
        Ok(distinct.into_iter().take(limit).collect())
    }

    fn query_suggestions(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let needle = fragment.to_lowercase();
        let queries = self.executed_queries.read().unwrap();
        let distinct: BTreeSet<String> = queries
            .iter()
            .filter(|q| q.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(distinct.into_iter().take(limit).collect())
    }

    fn count_by_type(&self, content_type: ContentType) -> Result<u64, RepositoryError> {
        let items = self.items.read().unwrap();
        Ok(items.iter().filter(|i| i.content_type == content_type).count() as u64)
    }
}
