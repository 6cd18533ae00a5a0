//! Keyword extraction from free-text queries

use regex::Regex;
use std::collections::BTreeSet;

/// English function words dropped from queries before lexical scoring
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "this", "that", "with", "from", "they", "will", "would",
    "there", "their", "what", "which", "when", "where", "who", "whom", "why", "how", "about",
    "into", "than", "then", "them", "these", "those", "some", "such", "were", "been", "being",
    "does", "doing", "did", "its", "his", "she", "him", "your", "ours",
];

/// Turns a free-text query into a normalized set of search tokens
pub struct KeywordExtractor {
    word_re: Regex,
    stop_words: BTreeSet<&'static str>,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            word_re: Regex::new(r"\w+").expect("word regex"),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Extract lowercase tokens, discarding stop words and tokens of
    /// length <= 2. Order is not significant; the returned list is
    /// deduplicated and deterministic.
    pub fn extract(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        let tokens: BTreeSet<String> = self
            .word_re
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|t| t.chars().count() > 2)
            .filter(|t| !self.stop_words.contains(t.as_str()))
            .collect();
        tokens.into_iter().collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}
