//! JSON file persistence sink
//!
//! Writes the three result collections of a run to three files under the
//! configured base directory:
//!
//! - `{name}.json` - extracted data records
//! - `{name}_fetch_err.json` - fetch-error records
//! - `{name}_parse_err.json` - parse-error records

use crate::engine::ScrapeResults;
use crate::output::traits::{OutputResult, Persist};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonSink {
    base_dir: PathBuf,
}

impl JsonSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn data_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.json"))
    }

    pub fn fetch_err_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}_fetch_err.json"))
    }

    pub fn parse_err_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}_parse_err.json"))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> OutputResult<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

impl Persist for JsonSink {
    fn persist(&self, name: &str, results: &ScrapeResults) -> OutputResult<()> {
        fs::create_dir_all(&self.base_dir)?;

        self.write_json(&self.data_path(name), &results.data)?;
        self.write_json(&self.fetch_err_path(name), &results.fetch_errors)?;
        self.write_json(&self.parse_err_path(name), &results.parse_errors)?;

        tracing::info!(
            "persisted job '{}' to {} ({} data, {} fetch errors, {} parse errors)",
            name,
            self.base_dir.display(),
            results.data.len(),
            results.fetch_errors.len(),
            results.parse_errors.len()
        );
        Ok(())
    }
}
