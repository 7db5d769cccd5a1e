//! Configuration module for Siteseeker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use siteseeker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("siteseeker.toml")).unwrap();
//! println!("Cycle ceiling: {}", config.crawler.max_crawl_cycles);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClassifierConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
