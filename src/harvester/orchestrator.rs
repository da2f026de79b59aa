//! Harvest orchestration
//!
//! Drives the whole pipeline: listing-page iteration, link discovery via
//! the extractor, dedup against the visited set, per-article fetch and
//! extraction, the stop-on-empty-page heuristic, inter-page politeness
//! delays, and the final bulk upsert.

use crate::cache::CacheStore;
use crate::config::{Config, TermVariant};
use crate::extract::{Extractor, HtmlExtractor};
use crate::harvester::{Fetcher, VisitedSet};
use crate::storage::{ArticleRecord, SqliteStorage, Storage};
use crate::Result;
use rand::Rng;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Main harvester structure
///
/// Owns the storage connection for the duration of a run; the cache store
/// shares it behind the same handle. Execution is fully sequential.
pub struct Harvester {
    config: Config,
    storage: Arc<Mutex<SqliteStorage>>,
    cache: CacheStore,
    fetcher: Fetcher,
    visited: VisitedSet,
    extractor: Box<dyn Extractor>,
}

impl Harvester {
    /// Creates a harvester with the default HTML extractor
    pub fn new(config: Config) -> Result<Self> {
        let extractor = Box::new(HtmlExtractor::new(config.harvest.source_label.clone()));
        Self::with_extractor(config, extractor)
    }

    /// Creates a harvester with a custom extractor implementation
    ///
    /// Opens the database, builds the cache store and fetcher on top of it,
    /// and seeds the visited set from the keys already persisted.
    pub fn with_extractor(config: Config, extractor: Box<dyn Extractor>) -> Result<Self> {
        let storage = Arc::new(Mutex::new(SqliteStorage::new(Path::new(
            &config.output.database_path,
        ))?));

        let ttl = Duration::from_secs(config.cache.ttl_hours * 3600);
        let cache = CacheStore::new(Path::new(&config.cache.directory), ttl, storage.clone())?;
        let fetcher = Fetcher::new(cache.clone(), config.fetch.clone())?;

        let visited = {
            let guard = storage.lock().unwrap();
            VisitedSet::seeded(guard.existing_keys()?)
        };
        tracing::info!("Seeded visited set with {} URLs from the database", visited.len());

        Ok(Self {
            config,
            storage,
            cache,
            fetcher,
            visited,
            extractor,
        })
    }

    /// Number of canonical URLs currently marked visited
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Builds the listing URL for a search term and page index
    fn listing_url(&self, term: &str, page: u32) -> String {
        let base = &self.config.search.base_url;
        let encoded = term.replace(' ', "%20");
        if page == 1 {
            format!("{}?q={}", base, encoded)
        } else {
            format!("{}?q={}&page={}", base, encoded, page)
        }
    }

    /// Runs one harvest pass per configured term variant
    ///
    /// Returns the total number of rows inserted or updated.
    pub async fn run_all(&mut self) -> Result<usize> {
        let variants = self.config.harvest.term_variants.clone();
        let mut total = 0;
        for variant in variants {
            total += self.run(variant).await?;
        }
        Ok(total)
    }

    /// Runs a single harvest pass over the configured page range
    ///
    /// Walks pages `1..=pages`, collecting a record per newly-seen article,
    /// and finishes with one bulk upsert. A listing page that fails to
    /// fetch is skipped; a page that yields zero new articles stops the
    /// pass early, as a proxy for having reached the last page.
    pub async fn run(&mut self, variant: TermVariant) -> Result<usize> {
        let term = self.config.harvest.term(variant).to_string();
        let pages = self.config.harvest.pages;
        tracing::info!("Starting harvest pass for term '{}' over {} pages", term, pages);

        let mut records: Vec<ArticleRecord> = Vec::new();

        for page in 1..=pages {
            let url = self.listing_url(&term, page);
            tracing::info!("Harvesting page {}: {}", page, url);

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Error fetching listing page {}: {}", page, e);
                    continue;
                }
            };

            let links = self
                .extractor
                .extract_links(&html, &self.config.search.base_url);
            if links.is_empty() {
                tracing::warn!(
                    "No articles found on page {}. The selector might need updating.",
                    page
                );
            }

            let mut processed: u32 = 0;
            for link in &links {
                if processed >= self.config.harvest.max_articles_per_page {
                    break;
                }

                if self.visited.contains(&link.url) {
                    tracing::debug!("Already processed URL: {}", link.url);
                    continue;
                }

                if let Some(record) = self.harvest_article(&link.url, &link.title).await {
                    tracing::info!("Successfully harvested: {}", record.title);
                    records.push(record);
                    processed += 1;
                }
            }

            if processed == 0 {
                tracing::info!(
                    "No new articles found on page {}. This might be the last page.",
                    page
                );
                break;
            }

            if page < pages {
                self.page_delay().await;
            }
        }

        let saved = {
            let mut storage = self.storage.lock().unwrap();
            storage.upsert_records(&records)?
        };

        tracing::info!("Harvest pass for '{}' saved {} records", term, saved);
        Ok(saved)
    }

    /// Fetches and extracts a single article
    ///
    /// The URL is marked visited once fetched, whatever extraction yields;
    /// a fetch failure leaves it unmarked so a later page may retry it.
    async fn harvest_article(&mut self, url: &str, fallback_title: &str) -> Option<ArticleRecord> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Error fetching {}: {}", url, e);
                return None;
            }
        };

        self.visited.insert(url);

        self.extractor.extract_record(url, &html, Some(fallback_title))
    }

    /// Sleeps a randomized interval within the inter-page politeness window
    async fn page_delay(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(
                self.config.fetch.page_delay_min_ms..=self.config.fetch.page_delay_max_ms,
            )
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    /// Routine cache grooming: durable eviction plus a file-tier sweep
    ///
    /// Each tier uses its own configured window. Returns the total number
    /// of entries cleared.
    pub fn clear_old_cache(&self) -> Result<usize> {
        let durable_age = Duration::from_secs(self.config.cache.eviction_hours * 3600);
        let file_retention = Duration::from_secs(self.config.cache.file_retention_days * 86400);

        let file_cleared = self.cache.sweep_files(file_retention);
        let db_cleared = self.cache.evict_older_than(durable_age)?;

        let total = file_cleared + db_cleared;
        tracing::info!("Cleared a total of {} old cache entries", total);
        Ok(total)
    }

    /// Truncates the durable cache table unconditionally
    pub fn clear_all_cache(&self) -> Result<usize> {
        self.cache.evict_all()
    }

    /// Administrative reset: empties the visited set and truncates the
    /// durable cache table, so the next pass re-harvests everything
    pub fn reset(&mut self) -> Result<usize> {
        self.visited.reset();
        let cleared = self.cache.evict_all()?;
        tracing::info!("Reset visited URLs; cleared {} cache entries", cleared);
        Ok(cleared)
    }
}
