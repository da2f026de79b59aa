//! Configuration module for Kumo-Press
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use kumo_press::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Harvest will walk {} listing pages", config.harvest.pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    CacheConfig, Config, FetchConfig, HarvestConfig, OutputConfig, SearchConfig, TermVariant,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
