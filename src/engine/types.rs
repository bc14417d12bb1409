//! Shared data types for the scrape engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A unit of work: one URL to fetch
///
/// Jobs are immutable once enqueued. A job whose attempt fails is re-created
/// (re-enqueued) in a later round from its error record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    /// The URL to fetch
    pub url: String,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// A successfully fetched response, tagged with its originating job
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL the job was enqueued with
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    ///
    /// Any HTTP response counts as a fetch success, including 4xx/5xx;
    /// status handling is the parse collaborator's concern.
    pub status: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// Record of a failed fetch attempt for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchErrorRecord {
    /// The URL that failed
    pub url: String,

    /// Error description
    pub error: String,
}

/// Record of a failed parse attempt for one fetched response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseErrorRecord {
    /// The URL whose response failed to parse
    pub url: String,

    /// Error description
    pub error: String,

    /// Full error chain, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// The three accumulated output collections of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeResults {
    /// Extracted data records
    pub data: Vec<Value>,

    /// Jobs that failed at the fetch stage
    pub fetch_errors: Vec<FetchErrorRecord>,

    /// Responses that failed at the parse stage
    pub parse_errors: Vec<ParseErrorRecord>,
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The job set converged: no pending jobs and no errors remain
    Completed,

    /// No distinct progress between two rounds; the run was aborted
    /// with everything accumulated so far persisted
    Stuck,
}

/// Summary of a finished run, reported before persisting
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Job name the results were persisted under
    pub name: String,

    /// How the run ended
    pub outcome: RunOutcome,

    /// Number of rounds that seeded and fetched jobs
    pub rounds: u32,

    /// Count of extracted data records
    pub data: usize,

    /// Count of fetch-error records
    pub fetch_errors: usize,

    /// Count of parse-error records
    pub parse_errors: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
