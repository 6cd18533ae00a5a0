//! Fusion of semantic and keyword candidate sets
//!
//! Semantic hits carry a stronger relevance signal than raw keyword
//! frequency, so they enter the merge map with a boosted score. Items found
//! by both signals get a combined boost on top, and no score ever exceeds
//! 1.0.

use crate::types::{ContentType, SearchResult};
use ahash::AHashMap;
use std::cmp::Ordering;

/// Configuration for fusion scoring
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Multiplier for semantic scores, capped at 1.0
    pub semantic_boost: f32,

    /// Multiplier for the averaged dual-signal score, capped at 1.0
    pub combined_boost: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            semantic_boost: 1.2,
            combined_boost: 1.1,
        }
    }
}

/// Content-identity key recognizing "the same underlying item" across
/// retrieval signals
///
/// Content type + title + hash of the first ~100 chars of the body, so
/// near-identical re-fetches collapse even without a stable identifier.
pub fn identity_key(content_type: ContentType, title: &str, content: &str) -> String {
    let head: String = content.chars().take(100).collect();
    let digest = blake3::hash(head.as_bytes());
    format!("{}:{}:{}", content_type.as_str(), title, digest.to_hex())
}

fn result_key(result: &SearchResult) -> String {
    identity_key(result.content_type, &result.title, &result.content)
}

/// Merge semantic and keyword candidates into one deduplicated,
/// descending-ranked list
///
/// A dual-signal item's combined score is `min(1.0, avg * combined_boost)`,
/// floored at its best single-signal score so being found twice never
/// ranks an item lower.
pub fn fuse(
    semantic: Vec<SearchResult>,
    keyword: Vec<SearchResult>,
    config: &FusionConfig,
) -> Vec<SearchResult> {
    let mut merged: AHashMap<String, SearchResult> = AHashMap::new();

    for mut result in semantic {
        result.similarity = (result.similarity * config.semantic_boost).min(1.0);
        let key = result_key(&result);
        match merged.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                if result.similarity > slot.get().similarity {
                    slot.insert(result);
                }
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(result);
            }
        }
    }

    for result in keyword {
        let key = result_key(&result);
        match merged.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let existing = slot.get().similarity;
                let averaged = ((existing + result.similarity) / 2.0 * config.combined_boost)
                    .min(1.0);
                slot.get_mut().similarity = averaged.max(existing).max(result.similarity);
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(result);
            }
        }
    }

    let mut results: Vec<SearchResult> = merged.into_values().collect();
    rank(&mut results);
    results
}

/// Sort results by score descending; equal scores break by id ascending
/// so ordering is deterministic regardless of map iteration order
pub fn rank(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
