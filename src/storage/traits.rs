//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::ArticleRecord;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the harvester:
/// seeding the visited set, bulk record upsert, and the durable tier of
/// the response cache.
pub trait Storage {
    // ===== Records =====

    /// Returns all canonical URLs currently persisted
    ///
    /// Used to seed the visited set at harvester construction.
    fn existing_keys(&self) -> StorageResult<HashSet<String>>;

    /// Inserts or updates a batch of records
    ///
    /// Each record is keyed by its canonical URL: a new URL inserts a row,
    /// a known URL updates all mutable fields in place. A row that fails is
    /// logged and skipped without aborting the rest of the batch.
    ///
    /// Returns the number of rows actually inserted or updated.
    fn upsert_records(&mut self, records: &[ArticleRecord]) -> StorageResult<usize>;

    // ===== Response cache (durable tier) =====

    /// Gets a cached payload and its storage timestamp by key digest
    fn cache_get(&self, key_hash: &str) -> StorageResult<Option<(String, String)>>;

    /// Stores a payload in the cache, replacing any entry with the same digest
    fn cache_put(
        &mut self,
        key_hash: &str,
        url: &str,
        payload: &str,
        stored_at: &str,
    ) -> StorageResult<()>;

    /// Removes cache entries stored before the given cutoff
    ///
    /// Returns the number of entries removed.
    fn evict_cache_older_than(&mut self, cutoff: DateTime<Utc>) -> StorageResult<usize>;

    /// Removes every cache entry unconditionally
    ///
    /// Returns the number of entries removed.
    fn evict_all_cache(&mut self) -> StorageResult<usize>;

    // ===== Statistics =====

    /// Counts persisted records
    fn count_records(&self) -> StorageResult<u64>;

    /// Counts persisted records grouped by source label
    fn counts_by_source(&self) -> StorageResult<HashMap<String, u64>>;

    /// Returns the most recent fetch timestamp, if any records exist
    fn latest_fetch(&self) -> StorageResult<Option<String>>;
}
