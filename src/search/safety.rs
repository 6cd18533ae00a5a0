//! Raw-query gating
//!
//! Raw-query mode is a restricted pass-through for read-only retrieval
//! expressions. Anything that is not a SELECT, or that contains a mutating
//! keyword anywhere in the string, is rejected before execution.

use crate::error::{Result, SearchError};
use regex::Regex;

/// Vets raw-query expressions before they reach the repository
pub struct RawQueryGuard {
    mutating: Regex,
}

impl RawQueryGuard {
    pub fn new() -> Self {
        Self {
            mutating: Regex::new(r"(?i)\b(drop|delete|insert|update|alter|create|truncate)\b")
                .expect("mutating-keyword regex"),
        }
    }

    /// Accept only read-only retrieval expressions
    pub fn check(&self, sql: &str) -> Result<()> {
        let trimmed = sql.trim();

        let starts_with_select = trimmed
            .get(..6)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("select"));
        if !starts_with_select {
            return Err(SearchError::UnsafeRawQuery(
                "only SELECT expressions are allowed".to_string(),
            ));
        }

        if let Some(found) = self.mutating.find(trimmed) {
            return Err(SearchError::UnsafeRawQuery(format!(
                "mutating keyword {} is not allowed",
                found.as_str().to_uppercase()
            )));
        }

        Ok(())
    }
}

impl Default for RawQueryGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_accepted() {
        let guard = RawQueryGuard::new();
        assert!(guard.check("SELECT title FROM items").is_ok());
        assert!(guard.check("  select id, title from items  ").is_ok());
    }

    #[test]
    fn test_delete_rejected() {
        let guard = RawQueryGuard::new();
        assert!(matches!(
            guard.check("DELETE FROM items"),
            Err(SearchError::UnsafeRawQuery(_))
        ));
    }

    #[test]
    fn test_non_select_rejected() {
        let guard = RawQueryGuard::new();
        assert!(guard.check("PRAGMA table_info(items)").is_err());
        assert!(guard.check("").is_err());
    }

    #[test]
    fn test_mutating_keyword_rejected_anywhere() {
        let guard = RawQueryGuard::new();
        assert!(guard.check("SELECT 1; DROP TABLE items").is_err());
        assert!(guard.check("SELECT * FROM items WHERE note = 'x' UPDATE").is_err());
        assert!(guard.check("select truncate from t").is_err());
    }

    #[test]
    fn test_keyword_match_is_word_bounded() {
        let guard = RawQueryGuard::new();
        // Column names merely containing a keyword are fine
        assert!(guard.check("SELECT updated_at, created_by FROM items").is_ok());
    }

    #[test]
    fn test_case_insensitive_rejection() {
        let guard = RawQueryGuard::new();
        assert!(guard.check("SELECT * FROM items; dRoP TABLE items").is_err());
    }
}
