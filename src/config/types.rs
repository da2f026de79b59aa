use serde::Deserialize;

/// Main configuration structure for Kumo-Press
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Which search term phrasing a harvest pass uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermVariant {
    /// The short form (e.g. "AI")
    Short,
    /// The spelled-out form (e.g. "artificial intelligence")
    Long,
}

/// Harvest behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Number of listing pages to walk per pass
    pub pages: u32,

    /// Cap on articles processed from a single listing page
    #[serde(rename = "max-articles-per-page")]
    pub max_articles_per_page: u32,

    /// Short search term
    #[serde(rename = "short-term")]
    pub short_term: String,

    /// Long search term
    #[serde(rename = "long-term")]
    pub long_term: String,

    /// Which term variants to run, in order
    #[serde(rename = "term-variants", default = "default_term_variants")]
    pub term_variants: Vec<TermVariant>,

    /// Source label stamped on every record
    #[serde(rename = "source-label")]
    pub source_label: String,
}

fn default_term_variants() -> Vec<TermVariant> {
    vec![TermVariant::Short, TermVariant::Long]
}

impl HarvestConfig {
    /// Resolves a term variant to its configured search phrase
    pub fn term(&self, variant: TermVariant) -> &str {
        match variant {
            TermVariant::Short => &self.short_term,
            TermVariant::Long => &self.long_term,
        }
    }
}

/// Search listing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the paginated search listing
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Two-tier cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory for the file fast tier (one file per cached key)
    pub directory: String,

    /// Maximum age at which a cached entry may still be reused (hours)
    #[serde(rename = "ttl-hours")]
    pub ttl_hours: u64,

    /// Age cutoff for the routine durable-tier eviction sweep (hours)
    #[serde(rename = "eviction-hours")]
    pub eviction_hours: u64,

    /// Retention window for the file tier's own grooming sweep (days)
    #[serde(rename = "file-retention-days")]
    pub file_retention_days: u64,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Number of retries after the initial attempt on transient failures
    #[serde(rename = "retry-count")]
    pub retry_count: u32,

    /// Base of the exponential retry backoff (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Politeness window after each network fetch (milliseconds)
    #[serde(rename = "request-delay-min-ms")]
    pub request_delay_min_ms: u64,
    #[serde(rename = "request-delay-max-ms")]
    pub request_delay_max_ms: u64,

    /// Politeness window between listing pages (milliseconds)
    #[serde(rename = "page-delay-min-ms")]
    pub page_delay_min_ms: u64,
    #[serde(rename = "page-delay-max-ms")]
    pub page_delay_max_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
