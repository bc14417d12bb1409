//! Shared result buffers for workers and the convergence driver
//!
//! All mutable state shared between the worker pool and the driver lives
//! here, behind a single mutex. The guard is held only for O(1) appends and
//! reads, never across a network call; workers do their fetching outside
//! the lock and only enter it to record the outcome.

use crate::engine::types::{FetchErrorRecord, FetchedPage, Job, ParseErrorRecord, ScrapeResults};
use serde_json::Value;
use std::sync::Mutex;

/// Read-only snapshot of the buffer counts, for progress reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub data: usize,
    pub fetch_errors: usize,
    pub parse_errors: usize,

    /// Attempts completed in the current round
    pub completed: usize,

    /// Jobs enqueued in the current round
    pub round_size: usize,
}

#[derive(Default)]
struct Buffers {
    /// Successful responses pending parse, drained once per round
    responses: Vec<FetchedPage>,
    data: Vec<Value>,
    fetch_errors: Vec<FetchErrorRecord>,
    parse_errors: Vec<ParseErrorRecord>,
    completed: usize,
    round_size: usize,
}

/// Passive holder of the shared buffers; see module docs for the locking
/// discipline.
#[derive(Default)]
pub struct ResultAggregator {
    inner: Mutex<Buffers>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the completed counter for a new round of `round_size` jobs.
    pub fn begin_round(&self, round_size: usize) {
        let mut inner = self.lock();
        inner.completed = 0;
        inner.round_size = round_size;
    }

    /// Records a successful fetch and counts the attempt as completed.
    pub fn record_response(&self, page: FetchedPage) {
        let mut inner = self.lock();
        inner.responses.push(page);
        inner.completed += 1;
        trace_progress(&inner);
    }

    /// Records a failed fetch and counts the attempt as completed.
    pub fn record_fetch_error(&self, job: &Job, error: String) {
        let mut inner = self.lock();
        inner.fetch_errors.push(FetchErrorRecord {
            url: job.url.clone(),
            error,
        });
        inner.completed += 1;
        trace_progress(&inner);
    }

    /// Atomically returns and empties the success buffer.
    ///
    /// Called once per round by the parse stage, after the drain barrier has
    /// released; no worker can be appending at that point.
    pub fn take_responses(&self) -> Vec<FetchedPage> {
        std::mem::take(&mut self.lock().responses)
    }

    /// Jobs to re-seed: the origins of every buffered fetch and parse error.
    pub fn error_jobs(&self) -> Vec<Job> {
        let inner = self.lock();
        inner
            .fetch_errors
            .iter()
            .map(|record| Job::new(record.url.clone()))
            .chain(
                inner
                    .parse_errors
                    .iter()
                    .map(|record| Job::new(record.url.clone())),
            )
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        let inner = self.lock();
        !inner.fetch_errors.is_empty() || !inner.parse_errors.is_empty()
    }

    /// Clears both error buffers once their jobs have been re-seeded.
    pub fn clear_errors(&self) {
        let mut inner = self.lock();
        inner.fetch_errors.clear();
        inner.parse_errors.clear();
    }

    pub fn push_records(&self, records: impl IntoIterator<Item = Value>) {
        self.lock().data.extend(records);
    }

    pub fn push_parse_error(&self, record: ParseErrorRecord) {
        self.lock().parse_errors.push(record);
    }

    pub fn counts(&self) -> Counts {
        let inner = self.lock();
        Counts {
            data: inner.data.len(),
            fetch_errors: inner.fetch_errors.len(),
            parse_errors: inner.parse_errors.len(),
            completed: inner.completed,
            round_size: inner.round_size,
        }
    }

    /// Drains the three output collections and resets all shared state,
    /// ready for reuse by a subsequent run.
    pub fn take_all(&self) -> ScrapeResults {
        let mut inner = self.lock();
        let results = ScrapeResults {
            data: std::mem::take(&mut inner.data),
            fetch_errors: std::mem::take(&mut inner.fetch_errors),
            parse_errors: std::mem::take(&mut inner.parse_errors),
        };
        inner.responses.clear();
        inner.completed = 0;
        inner.round_size = 0;
        results
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Buffers> {
        self.inner.lock().expect("result aggregator mutex poisoned")
    }
}

fn trace_progress(inner: &Buffers) {
    if inner.round_size > 0 {
        tracing::trace!(
            "progress: {:.2}% ({}/{})",
            100.0 * inner.completed as f64 / inner.round_size as f64,
            inner.completed,
            inner.round_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(url: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            final_url: url.to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: String::new(),
        }
    }

    #[test]
    fn test_record_response_counts_attempt() {
        let results = ResultAggregator::new();
        results.begin_round(2);
        results.record_response(page("https://example.com/a"));
        results.record_fetch_error(&Job::new("https://example.com/b"), "timeout".to_string());

        let counts = results.counts();
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.fetch_errors, 1);
        assert_eq!(results.take_responses().len(), 1);
    }

    #[test]
    fn test_take_responses_empties_buffer() {
        let results = ResultAggregator::new();
        results.begin_round(1);
        results.record_response(page("https://example.com"));

        assert_eq!(results.take_responses().len(), 1);
        assert!(results.take_responses().is_empty());
    }

    #[test]
    fn test_error_jobs_covers_both_buffers() {
        let results = ResultAggregator::new();
        results.begin_round(1);
        results.record_fetch_error(&Job::new("https://example.com/f"), "refused".to_string());
        results.push_parse_error(ParseErrorRecord {
            url: "https://example.com/p".to_string(),
            error: "no body".to_string(),
            trace: None,
        });

        let jobs = results.error_jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].url, "https://example.com/f");
        assert_eq!(jobs[1].url, "https://example.com/p");

        results.clear_errors();
        assert!(!results.has_errors());
        assert!(results.error_jobs().is_empty());
    }

    #[test]
    fn test_take_all_resets_everything() {
        let results = ResultAggregator::new();
        results.begin_round(1);
        results.record_fetch_error(&Job::new("https://example.com"), "timeout".to_string());
        results.push_records([json!({"k": 1})]);

        let taken = results.take_all();
        assert_eq!(taken.data.len(), 1);
        assert_eq!(taken.fetch_errors.len(), 1);

        let counts = results.counts();
        assert_eq!(counts.data, 0);
        assert_eq!(counts.fetch_errors, 0);
        assert_eq!(counts.completed, 0);
    }
}
