//! SQLite-backed content repository
//!
//! Thin adapter over a pooled SQLite database. Items live in a single
//! `items` table with embeddings and metadata stored as JSON text; executed
//! raw-query texts are recorded in `query_log` for suggestion lookups.

use crate::storage::{ContentRepository, RepositoryError, Row};
use crate::types::{ContentType, IndexedItem};
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use rusqlite::params;
use std::collections::HashMap;
use std::path::Path;

type DbPool = Pool<SqliteConnectionManager>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        content_type TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        embedding TEXT,
        source TEXT,
        category TEXT,
        created_at TEXT NOT NULL,
        metadata TEXT NOT NULL DEFAULT '{}',
        active INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX IF NOT EXISTS idx_items_content_type ON items(content_type);
    CREATE TABLE IF NOT EXISTS query_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        query_text TEXT NOT NULL,
        executed_at TEXT NOT NULL
    );
";

/// SQLite `ContentRepository` implementation
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    /// Open (or create) a repository at the given path
    pub fn open(db_path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder().max_size(8).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            conn.execute_batch(SCHEMA)?;
        }

        Ok(Self { pool })
    }

    /// Open an in-memory repository
    ///
    /// Pool size is pinned to 1: each pooled in-memory connection would
    /// otherwise see its own private database.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)?;
        }

        Ok(Self { pool })
    }

    fn render_value(value: ValueRef<'_>) -> String {
        match value {
            ValueRef::Null => "NULL".to_string(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
            ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// Intermediate row shape pulled out of the `items` table before
/// conversion into `IndexedItem`
struct StoredItem {
    id: String,
    content_type: String,
    title: String,
    content: String,
    embedding: Option<String>,
    source: Option<String>,
    category: Option<String>,
    created_at: String,
    metadata: String,
}

impl StoredItem {
    fn into_item(self) -> Result<IndexedItem, RepositoryError> {
        let content_type = ContentType::parse(&self.content_type).ok_or_else(|| {
            RepositoryError::InvalidColumn {
                column: "content_type".to_string(),
                value: self.content_type.clone(),
            }
        })?;

        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| RepositoryError::InvalidColumn {
                column: "created_at".to_string(),
                value: self.created_at.clone(),
            })?;

        let embedding = match &self.embedding {
            Some(raw) => {
                Some(
                    serde_json::from_str::<Vec<f32>>(raw).map_err(|source| {
                        RepositoryError::Json {
                            source,
                            context: format!("embedding for item {}", self.id),
                        }
                    })?,
                )
            }
            None => None,
        };

        let metadata: HashMap<String, serde_json::Value> = serde_json::from_str(&self.metadata)
            .map_err(|source| RepositoryError::Json {
                source,
                context: format!("metadata for item {}", self.id),
            })?;

        Ok(IndexedItem {
            id: self.id,
            content_type,
            title: self.title,
            content: self.content,
            embedding,
            source: self.source,
            category: self.category,
            created_at,
            metadata,
        })
    }
}

impl ContentRepository for SqliteRepository {
    fn fetch_all(&self) -> Result<Vec<IndexedItem>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, content_type, title, content, embedding, source, category,
                    created_at, metadata
             FROM items WHERE active = 1
             ORDER BY created_at DESC",
        )?;

        let stored: Vec<StoredItem> = stmt
            .query_map([], |row| {
                Ok(StoredItem {
                    id: row.get(0)?,
                    content_type: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    embedding: row.get(4)?,
                    source: row.get(5)?,
                    category: row.get(6)?,
                    created_at: row.get(7)?,
                    metadata: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        stored.into_iter().map(StoredItem::into_item).collect()
    }

    fn store(&self, item: &IndexedItem) -> Result<(), RepositoryError> {
        let embedding = match &item.embedding {
            Some(vector) => Some(serde_json::to_string(vector).map_err(|source| {
                RepositoryError::Json {
                    source,
                    context: format!("embedding for item {}", item.id),
                }
            })?),
            None => None,
        };

        let metadata =
            serde_json::to_string(&item.metadata).map_err(|source| RepositoryError::Json {
                source,
                context: format!("metadata for item {}", item.id),
            })?;

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO items
                (id, content_type, title, content, embedding, source, category,
                 created_at, metadata, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1)",
            params![
                item.id,
                item.content_type.as_str(),
                item.title,
                item.content,
                embedding,
                item.source,
                item.category,
                item.created_at.to_rfc3339(),
                metadata,
            ],
        )?;

        Ok(())
    }

    fn raw_query(&self, sql: &str) -> Result<Vec<Row>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut rendered = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                rendered.push((column.clone(), Self::render_value(row.get_ref(i)?)));
            }
            out.push(rendered);
        }
        drop(rows);
        drop(stmt);

        conn.execute(
            "INSERT INTO query_log (query_text, executed_at) VALUES (?1, ?2)",
            params![sql, Utc::now().to_rfc3339()],
        )?;

        Ok(out)
    }

    fn title_suggestions(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT title FROM items
             WHERE active = 1 AND title LIKE ?1
             ORDER BY title LIMIT ?2",
        )?;

        let titles = stmt
            .query_map(params![format!("%{}%", fragment), limit as i64], |row| {
                row.get(0)
            })?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(titles)
    }

    fn query_suggestions(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT query_text FROM query_log
             WHERE query_text LIKE ?1
             ORDER BY query_text LIMIT ?2",
        )?;

        let queries = stmt
            .query_map(params![format!("%{}%", fragment), limit as i64], |row| {
                row.get(0)
            })?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(queries)
    }

    fn count_by_type(&self, content_type: ContentType) -> Result<u64, RepositoryError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE active = 1 AND content_type = ?1",
            params![content_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item(id: &str, content_type: ContentType) -> IndexedItem {
        IndexedItem {
            id: id.to_string(),
            content_type,
            title: format!("Item {}", id),
            content: "Stored body text".to_string(),
            embedding: Some(vec![0.1, 0.2, 0.3]),
            source: Some("unit".to_string()),
            category: Some("testing".to_string()),
            created_at: Utc::now(),
            metadata: HashMap::from([("key".to_string(), json!("value"))]),
        }
    }

    #[test]
    fn test_store_and_fetch_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let item = sample_item("a1", ContentType::Document);
        repo.store(&item).unwrap();

        let fetched = repo.fetch_all().unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "a1");
        assert_eq!(fetched[0].embedding, Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(fetched[0].metadata.get("key"), Some(&json!("value")));
    }

    #[test]
    fn test_store_replaces_existing_id() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut item = sample_item("a1", ContentType::Document);
        repo.store(&item).unwrap();

        item.title = "Updated".to_string();
        repo.store(&item).unwrap();

        let fetched = repo.fetch_all().unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].title, "Updated");
    }

    #[test]
    fn test_raw_query_renders_rows_and_logs() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.store(&sample_item("a1", ContentType::Document)).unwrap();

        let rows = repo.raw_query("SELECT id, title FROM items").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], ("id".to_string(), "a1".to_string()));
        assert_eq!(rows[0][1].0, "title");

        let logged = repo.query_suggestions("SELECT id, title", 10).unwrap();
        assert_eq!(logged.len(), 1);
    }

    #[test]
    fn test_count_by_type() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.store(&sample_item("a1", ContentType::Document)).unwrap();
        repo.store(&sample_item("a2", ContentType::Document)).unwrap();
        repo.store(&sample_item("c1", ContentType::Conversation))
            .unwrap();

        assert_eq!(repo.count_by_type(ContentType::Document).unwrap(), 2);
        assert_eq!(repo.count_by_type(ContentType::Conversation).unwrap(), 1);
        assert_eq!(repo.count_by_type(ContentType::LogEntry).unwrap(), 0);
    }

    #[test]
    fn test_open_on_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("data").join("busca.db");

        let repo = SqliteRepository::open(&path).unwrap();
        repo.store(&sample_item("a1", ContentType::TableData)).unwrap();

        assert!(path.exists());
        assert_eq!(repo.count_by_type(ContentType::TableData).unwrap(), 1);
    }

    #[test]
    fn test_title_suggestions_like_match() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut item = sample_item("a1", ContentType::Document);
        item.title = "PostgreSQL indexes".to_string();
        repo.store(&item).unwrap();

        let titles = repo.title_suggestions("postgres", 5).unwrap();
        assert_eq!(titles, vec!["PostgreSQL indexes".to_string()]);
    }
}
