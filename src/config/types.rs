use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for a scrape job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub job: JobConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub parse: ParseConfig,

    /// Initial URL set
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Job identity: name and where results land
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Job name, prefix for all data files
    #[serde(default = "default_name")]
    pub name: String,

    /// Base directory for all data files
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Worker pool behavior
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-fetch timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Which built-in parser turns responses into records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub mode: ParseMode,

    /// CSS selector, required by `mode = "select"`
    #[serde(default)]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// One record per response: URL and HTTP status code
    Status,

    /// One record per response: title and body text
    #[default]
    Text,

    /// One record per link on the page
    Links,

    /// One record per CSS-selector match
    Select,
}

fn default_name() -> String {
    "scrape".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_concurrency() -> usize {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("kumo/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}
