//! Caller-filter application and pagination
//!
//! Filtering never re-orders; truncation happens only after the full
//! filter chain so rank order from fusion is preserved.

use crate::types::{SearchFilter, SearchResult};

/// Apply a validated filter to a ranked result list and truncate to
/// `max_results`
///
/// Order of application: content type, category, date range, source,
/// minimum score, pagination.
pub fn apply(results: Vec<SearchResult>, filter: &SearchFilter) -> Vec<SearchResult> {
    let mut filtered: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| {
            filter
                .content_type
                .map_or(true, |ct| r.content_type == ct)
        })
        .filter(|r| {
            filter
                .category
                .as_deref()
                .map_or(true, |c| r.category.as_deref() == Some(c))
        })
        .filter(|r| within_date_range(r, filter))
        .filter(|r| {
            filter
                .source
                .as_deref()
                .map_or(true, |s| r.source.as_deref() == Some(s))
        })
        .filter(|r| r.similarity >= filter.min_similarity)
        .collect();

    filtered.truncate(filter.max_results);
    filtered
}

/// Inclusive date-range check; a result without a timestamp is dropped
/// when either bound is set
fn within_date_range(result: &SearchResult, filter: &SearchFilter) -> bool {
    if filter.date_from.is_none() && filter.date_to.is_none() {
        return true;
    }

    let Some(timestamp) = result.timestamp else {
        return false;
    };

    if let Some(from) = filter.date_from {
        if timestamp < from {
            return false;
        }
    }
    if let Some(to) = filter.date_to {
        if timestamp > to {
            return false;
        }
    }
    true
}
