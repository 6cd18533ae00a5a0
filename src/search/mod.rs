//! Hybrid search pipeline
//!
//! Keyword extraction, vector similarity, lexical scoring, score fusion,
//! filter application, result caching, and the query gateway tying them
//! together.

mod cache;
mod engine;
mod filters;
mod fusion;
mod keywords;
mod lexical;
mod safety;
mod vector;

pub use cache::ResultCache;
pub use engine::{SearchEngine, SearchResponse, SearchStats};
pub use filters::apply as apply_filters;
pub use fusion::{fuse, identity_key, rank, FusionConfig};
pub use keywords::KeywordExtractor;
pub use lexical::keyword_score;
pub use safety::RawQueryGuard;
pub use vector::{cosine_similarity, similarity_scan};
