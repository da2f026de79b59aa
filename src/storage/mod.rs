//! Storage module for persisting harvest data
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Article record upsert keyed by canonical URL
//! - The durable tier of the response cache, with time-based eviction

mod schema;
mod sqlite;
mod traits;

pub use schema::{get_schema_version, initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// An extracted article, keyed by its canonical URL
///
/// `id` is assigned by the store; records built by the extractor carry
/// `None` until persisted. Re-saving a record whose `url` already exists
/// replaces all mutable fields rather than creating a second row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_date: String,
    pub source: String,
    pub fetched_at: String,
    pub tags: Vec<String>,
}

impl ArticleRecord {
    /// Serializes tags as comma-joined text for storage
    pub fn tags_joined(&self) -> String {
        self.tags.join(",")
    }

    /// Parses the comma-joined tag column back into a list
    pub fn split_tags(joined: &str) -> Vec<String> {
        if joined.is_empty() {
            return Vec::new();
        }
        joined.split(',').map(|t| t.trim().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_roundtrip() {
        let record = ArticleRecord {
            id: None,
            title: "t".to_string(),
            content: "c".to_string(),
            url: "https://example.com/a".to_string(),
            published_date: "2024-01-01".to_string(),
            source: "Test".to_string(),
            fetched_at: "2024-01-01 00:00:00".to_string(),
            tags: vec!["ai".to_string(), "news".to_string()],
        };

        let joined = record.tags_joined();
        assert_eq!(joined, "ai,news");
        assert_eq!(ArticleRecord::split_tags(&joined), record.tags);
    }

    #[test]
    fn test_empty_tags() {
        assert_eq!(ArticleRecord::split_tags(""), Vec::<String>::new());
    }
}
