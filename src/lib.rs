//! Kumo: a concurrent scrape-and-retry engine
//!
//! This crate implements a bounded worker pool that fetches a dynamic set of
//! URLs, separates successes from fetch failures and parse failures, and
//! retries failed jobs round after round until the job set converges or no
//! progress is made between rounds.

pub mod config;
pub mod engine;
pub mod fetch;
pub mod output;
pub mod parse;

use thiserror::Error;

/// Main error type for Kumo operations
#[derive(Debug, Error)]
pub enum KumoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Kumo operations
pub type Result<T> = std::result::Result<T, KumoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ScrapeConfig;
pub use engine::{
    FetchErrorRecord, FetchedPage, Job, ParseErrorRecord, RunOutcome, RunReport, ScrapeResults,
    Scraper,
};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use output::{JsonSink, Persist};
pub use parse::ParseResponse;
