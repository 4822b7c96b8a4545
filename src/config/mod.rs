//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a run without a file targets the FMA listing.
//!
//! # Example
//!
//! ```no_run
//! use fma_warnings::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {}", config.crawler.list_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, PAGE_PLACEHOLDER, START_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
