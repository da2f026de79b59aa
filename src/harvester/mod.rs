//! Harvest pipeline
//!
//! This module contains the core harvesting logic, including:
//! - Cache-first HTTP fetching with retry, backoff, and identity rotation
//! - The in-memory visited set guarding against duplicate work
//! - Overall harvest orchestration (page walk, dedup, early stop, save)

mod fetcher;
mod orchestrator;
mod visited;

pub use fetcher::{build_http_client, Fetcher};
pub use orchestrator::Harvester;
pub use visited::VisitedSet;

use crate::config::Config;
use crate::Result;

/// Runs a complete harvest over every configured term variant
///
/// This is the main entry point for a harvest. It will:
/// 1. Open the database and seed the visited set
/// 2. Build the cache store and HTTP fetcher on top of it
/// 3. Walk listing pages, fetching and extracting new articles
/// 4. Bulk-upsert everything collected
///
/// Returns the total number of rows inserted or updated.
pub async fn harvest(config: Config) -> Result<usize> {
    let mut harvester = Harvester::new(config)?;
    harvester.run_all().await
}
