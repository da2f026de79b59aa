//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::ArticleRecord;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// SQLite storage backend
///
/// One connection is opened per harvester run and held until the harvester
/// is dropped; no per-operation open/close.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Opens (or creates) the database at `path` and initializes the schema.
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    // ===== Records =====

    fn existing_keys(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM articles")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(keys)
    }

    fn upsert_records(&mut self, records: &[ArticleRecord]) -> StorageResult<usize> {
        if records.is_empty() {
            tracing::warn!("No records to save");
            return Ok(0);
        }

        let mut saved = 0;
        for record in records {
            let result = self.conn.execute(
                "INSERT INTO articles
                 (title, content, url, published_date, source, fetched_at, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(url) DO UPDATE SET
                     title = excluded.title,
                     content = excluded.content,
                     published_date = excluded.published_date,
                     source = excluded.source,
                     fetched_at = excluded.fetched_at,
                     tags = excluded.tags",
                params![
                    record.title,
                    record.content,
                    record.url,
                    record.published_date,
                    record.source,
                    record.fetched_at,
                    record.tags_joined(),
                ],
            );

            // A failing row is skipped, not fatal to the batch
            match result {
                Ok(changed) if changed > 0 => saved += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Failed to save record for {}: {}", record.url, e);
                }
            }
        }

        tracing::info!("Saved {} records to the database", saved);
        Ok(saved)
    }

    // ===== Response cache (durable tier) =====

    fn cache_get(&self, key_hash: &str) -> StorageResult<Option<(String, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, stored_at FROM request_cache WHERE key_hash = ?1",
                params![key_hash],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    fn cache_put(
        &mut self,
        key_hash: &str,
        url: &str,
        payload: &str,
        stored_at: &str,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO request_cache (key_hash, url, payload, stored_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key_hash, url, payload, stored_at],
        )?;
        Ok(())
    }

    fn evict_cache_older_than(&mut self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM request_cache WHERE stored_at < ?1",
            params![cutoff.to_rfc3339()],
        )?;
        tracing::info!("Evicted {} old entries from the durable cache", removed);
        Ok(removed)
    }

    fn evict_all_cache(&mut self) -> StorageResult<usize> {
        let removed = self.conn.execute("DELETE FROM request_cache", [])?;
        tracing::info!("Cleared {} entries from the durable cache", removed);
        Ok(removed)
    }

    // ===== Statistics =====

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn counts_by_source(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, COUNT(*) FROM articles GROUP BY source")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (source, count) = row?;
            counts.insert(source, count as u64);
        }

        Ok(counts)
    }

    fn latest_fetch(&self) -> StorageResult<Option<String>> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(fetched_at) FROM articles", [], |row| row.get(0))?;
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, title: &str, content: &str) -> ArticleRecord {
        ArticleRecord {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
            published_date: "2024-03-01".to_string(),
            source: "Khaleej Times".to_string(),
            fetched_at: Utc::now().to_rfc3339(),
            tags: vec!["ai".to_string()],
        }
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_upsert_inserts_new_records() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let records = vec![
            record("https://example.com/a", "A", "alpha"),
            record("https://example.com/b", "B", "beta"),
        ];

        let saved = storage.upsert_records(&records).unwrap();
        assert_eq!(saved, 2);
        assert_eq!(storage.count_records().unwrap(), 2);
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .upsert_records(&[record("https://example.com/a", "Old title", "old")])
            .unwrap();
        storage
            .upsert_records(&[record("https://example.com/a", "New title", "new")])
            .unwrap();

        // Exactly one row for the key, with the latest field values
        assert_eq!(storage.count_records().unwrap(), 1);
        let (title, content): (String, String) = storage
            .conn
            .query_row(
                "SELECT title, content FROM articles WHERE url = ?1",
                params!["https://example.com/a"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(title, "New title");
        assert_eq!(content, "new");
    }

    #[test]
    fn test_upsert_empty_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.upsert_records(&[]).unwrap(), 0);
    }

    #[test]
    fn test_existing_keys_seed() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .upsert_records(&[
                record("https://example.com/a", "A", "alpha"),
                record("https://example.com/b", "B", "beta"),
            ])
            .unwrap();

        let keys = storage.existing_keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("https://example.com/a"));
        assert!(keys.contains("https://example.com/b"));
    }

    #[test]
    fn test_cache_put_get_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let stored_at = Utc::now().to_rfc3339();
        storage
            .cache_put("abc123", "https://example.com/a", "<html/>", &stored_at)
            .unwrap();

        let (payload, ts) = storage.cache_get("abc123").unwrap().unwrap();
        assert_eq!(payload, "<html/>");
        assert_eq!(ts, stored_at);
    }

    #[test]
    fn test_cache_put_replaces_on_conflict() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .cache_put("abc123", "https://example.com/a", "first", "2024-01-01T00:00:00Z")
            .unwrap();
        storage
            .cache_put("abc123", "https://example.com/a", "second", "2024-01-02T00:00:00Z")
            .unwrap();

        let (payload, _) = storage.cache_get("abc123").unwrap().unwrap();
        assert_eq!(payload, "second");
    }

    #[test]
    fn test_cache_miss() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.cache_get("missing").unwrap().is_none());
    }

    #[test]
    fn test_evict_cache_older_than() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let old = (Utc::now() - chrono::Duration::hours(3)).to_rfc3339();
        let fresh = Utc::now().to_rfc3339();

        storage
            .cache_put("old", "https://example.com/old", "stale", &old)
            .unwrap();
        storage
            .cache_put("new", "https://example.com/new", "fresh", &fresh)
            .unwrap();

        let cutoff = Utc::now() - chrono::Duration::hours(1);
        let removed = storage.evict_cache_older_than(cutoff).unwrap();

        assert_eq!(removed, 1);
        assert!(storage.cache_get("old").unwrap().is_none());
        assert!(storage.cache_get("new").unwrap().is_some());
    }

    #[test]
    fn test_evict_all_cache() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let now = Utc::now().to_rfc3339();
        storage
            .cache_put("a", "https://example.com/a", "x", &now)
            .unwrap();
        storage
            .cache_put("b", "https://example.com/b", "y", &now)
            .unwrap();

        assert_eq!(storage.evict_all_cache().unwrap(), 2);
        assert!(storage.cache_get("a").unwrap().is_none());
    }

    #[test]
    fn test_counts_by_source() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut other = record("https://example.com/c", "C", "gamma");
        other.source = "Other Wire".to_string();
        storage
            .upsert_records(&[
                record("https://example.com/a", "A", "alpha"),
                record("https://example.com/b", "B", "beta"),
                other,
            ])
            .unwrap();

        let counts = storage.counts_by_source().unwrap();
        assert_eq!(counts.get("Khaleej Times"), Some(&2));
        assert_eq!(counts.get("Other Wire"), Some(&1));
    }

    #[test]
    fn test_latest_fetch_empty() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.latest_fetch().unwrap(), None);
    }
}
