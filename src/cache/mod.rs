//! Two-tier response cache
//!
//! Every successful fetch is written through both tiers:
//! - a file fast tier (one file per cached key, mtime doubles as the
//!   staleness clock),
//! - a durable tier backed by the storage layer's `request_cache` table.
//!
//! Reads check the file tier first, then the durable tier, under the same
//! TTL rule; a stale entry is treated identically to absence.

mod store;

pub use store::{key_hash, CacheStore};
