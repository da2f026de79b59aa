use crate::storage::{SqliteStorage, Storage};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Computes the fixed-length digest used as a cache key
///
/// SHA-256 over the canonical URL, hex-encoded. Deterministic, so both
/// tiers agree on the key for a given URL.
pub fn key_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Two-tier key/content cache with TTL-based staleness
#[derive(Clone)]
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
    storage: Arc<Mutex<SqliteStorage>>,
}

impl CacheStore {
    /// Creates a cache store rooted at `dir`, with the given read TTL
    ///
    /// The cache directory is created if it does not exist.
    pub fn new(
        dir: &Path,
        ttl: Duration,
        storage: Arc<Mutex<SqliteStorage>>,
    ) -> Result<Self, HarvestError> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            tracing::info!("Created cache directory: {}", dir.display());
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            ttl,
            storage,
        })
    }

    /// Path of the file-tier entry for a URL
    fn file_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.html", key_hash(url)))
    }

    /// Looks up a fresh cached payload for `url`
    ///
    /// File tier first, durable tier second. Entries older than the TTL are
    /// never returned, even if no eviction sweep has run yet. Tier I/O
    /// errors are logged and treated as a miss.
    pub fn get(&self, url: &str) -> Option<String> {
        if let Some(payload) = self.get_from_file_tier(url) {
            tracing::debug!("File cache hit for {}", url);
            return Some(payload);
        }

        if let Some(payload) = self.get_from_durable_tier(url) {
            tracing::debug!("Durable cache hit for {}", url);
            return Some(payload);
        }

        None
    }

    fn get_from_file_tier(&self, url: &str) -> Option<String> {
        let path = self.file_path(url);
        let metadata = std::fs::metadata(&path).ok()?;
        let modified = metadata.modified().ok()?;
        let age = modified.elapsed().ok()?;

        if age >= self.ttl {
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::error!("Error reading cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn get_from_durable_tier(&self, url: &str) -> Option<String> {
        let hash = key_hash(url);
        let row = {
            let storage = self.storage.lock().unwrap();
            match storage.cache_get(&hash) {
                Ok(row) => row,
                Err(e) => {
                    tracing::error!("Durable cache read failed for {}: {}", url, e);
                    return None;
                }
            }
        };

        let (payload, stored_at) = row?;
        let stored_at = match stored_at.parse::<DateTime<Utc>>() {
            Ok(ts) => ts,
            Err(e) => {
                tracing::error!("Unparseable cache timestamp for {}: {}", url, e);
                return None;
            }
        };

        let age = Utc::now().signed_duration_since(stored_at);
        if age.to_std().map(|a| a < self.ttl).unwrap_or(false) {
            Some(payload)
        } else {
            None
        }
    }

    /// Writes a payload through both tiers, stamped with the current time
    ///
    /// A failure in one tier is logged and does not abort the write to the
    /// other; the remaining tier continues to serve correctly.
    pub fn put(&self, url: &str, payload: &str) {
        let path = self.file_path(url);
        if let Err(e) = std::fs::write(&path, payload) {
            tracing::error!("Error saving to file cache {}: {}", path.display(), e);
        }

        let hash = key_hash(url);
        let stored_at = Utc::now().to_rfc3339();
        let mut storage = self.storage.lock().unwrap();
        if let Err(e) = storage.cache_put(&hash, url, payload, &stored_at) {
            tracing::error!("Error saving to durable cache for {}: {}", url, e);
        }
    }

    /// Removes durable-tier entries older than `max_age`
    pub fn evict_older_than(&self, max_age: Duration) -> crate::Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age)
                .unwrap_or_else(|_| chrono::Duration::hours(1));
        let mut storage = self.storage.lock().unwrap();
        Ok(storage.evict_cache_older_than(cutoff)?)
    }

    /// Removes file-tier entries whose modification time is older than
    /// `retention`
    ///
    /// The file tier grooms on its own window, independent of the durable
    /// sweep cadence.
    pub fn sweep_files(&self, retention: Duration) -> usize {
        let mut cleared = 0;

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Error reading cache directory: {}", e);
                return 0;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let expired = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|m| m.elapsed().ok())
                .map(|age| age > retention)
                .unwrap_or(false);

            if expired {
                match std::fs::remove_file(&path) {
                    Ok(()) => cleared += 1,
                    Err(e) => {
                        tracing::error!("Error removing cache file {}: {}", path.display(), e)
                    }
                }
            }
        }

        tracing::info!("Cleared {} old file cache entries", cleared);
        cleared
    }

    /// Truncates the durable cache table unconditionally
    pub fn evict_all(&self) -> crate::Result<usize> {
        let mut storage = self.storage.lock().unwrap();
        Ok(storage.evict_all_cache()?)
    }
}
