//! Vector similarity over item embeddings
//!
//! Linear scan over a materialized snapshot. This is the correctness
//! baseline; an ANN index could replace it behind the same contract as
//! long as the same items clear the threshold.

use crate::types::IndexedItem;

/// Cosine similarity between two vectors, clamped to [0,1]
///
/// Mismatched lengths and zero-magnitude vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}

/// Scan a snapshot for items whose embedding is at least `min_similarity`
/// close to the query vector
///
/// Items without a precomputed embedding are skipped, not scored as zero.
pub fn similarity_scan<'a>(
    query_vector: &[f32],
    items: &'a [IndexedItem],
    min_similarity: f32,
) -> Vec<(&'a IndexedItem, f32)> {
    items
        .iter()
        .filter_map(|item| {
            let embedding = item.embedding.as_ref()?;
            let score = cosine_similarity(query_vector, embedding);
            (score >= min_similarity).then_some((item, score))
        })
        .collect()
}
