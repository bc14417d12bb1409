//! Configuration module for Kumo
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every section is optional; defaults match the stock scrape job
//! (name "scrape", 500 workers, 30 second timeout, text parsing).
//!
//! # Example
//!
//! ```no_run
//! use kumo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("job.toml")).unwrap();
//! println!("Workers: {}", config.runner.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{JobConfig, ParseConfig, ParseMode, RunnerConfig, ScrapeConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
