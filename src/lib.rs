//! Kumo-Press: a polite news article harvester
//!
//! This crate fetches articles from a paginated search listing, avoids
//! refetching anything already known, and persists extracted records with
//! update-in-place semantics. Fetches go through a two-tier cache (file
//! fast tier + SQLite durable tier) and a retrying HTTP layer with rotating
//! client identities and randomized politeness delays.

pub mod cache;
pub mod config;
pub mod extract;
pub mod harvester;
pub mod storage;

use thiserror::Error;

/// Main error type for Kumo-Press operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the fetch layer
///
/// A `FetchError` is never fatal to a harvest run; the orchestrator skips
/// the affected page or article and continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error(
        "Retries exhausted for {url} after {attempts} attempts (last status: {last_status:?})"
    )]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Kumo-Press operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::CacheStore;
pub use config::Config;
pub use extract::{DiscoveredLink, Extractor, HtmlExtractor};
pub use harvester::{Fetcher, Harvester, VisitedSet};
pub use storage::{ArticleRecord, SqliteStorage, Storage};
