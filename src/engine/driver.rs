//! Convergence driver: rounds of seed, drain, parse, evaluate
//!
//! The driver owns the pending-URL set and the round protocol. Each round it
//! seeds the job queue from the pending set (original pending URLs plus the
//! jobs behind the previous round's fetch and parse errors), blocks until
//! the worker pool drains the round, runs the single-threaded parse stage,
//! and then decides whether to loop, stop (everything converged) or abort
//! (no distinct progress between two rounds).
//!
//! Both terminal transitions persist everything accumulated so far and
//! reset the shared state, so one `Scraper` can be renamed, reseeded and
//! re-run, e.g. to partition a large URL set across several output files.

use crate::config::ScrapeConfig;
use crate::engine::pool::WorkerPool;
use crate::engine::queue::JobQueue;
use crate::engine::results::ResultAggregator;
use crate::engine::types::{Job, ParseErrorRecord, RunOutcome, RunReport};
use crate::fetch::Fetch;
use crate::output::Persist;
use crate::parse::ParseResponse;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent scrape-and-retry engine
///
/// Construction spawns the worker pool; the fetch collaborator and the
/// per-fetch timeout are fixed from then on. Job name, URL set, and parse
/// collaborator stay reconfigurable between runs.
pub struct Scraper {
    name: String,
    pending: Vec<Job>,
    queue: Arc<JobQueue>,
    results: Arc<ResultAggregator>,
    pool: WorkerPool,
    parser: Arc<dyn ParseResponse>,
    sink: Arc<dyn Persist>,
}

impl Scraper {
    pub fn new(
        config: &ScrapeConfig,
        fetcher: Arc<dyn Fetch>,
        parser: Arc<dyn ParseResponse>,
        sink: Arc<dyn Persist>,
    ) -> Self {
        let queue = Arc::new(JobQueue::new());
        let results = Arc::new(ResultAggregator::new());
        let pool = WorkerPool::spawn(
            config.runner.concurrency,
            Arc::clone(&queue),
            Arc::clone(&results),
            fetcher,
            Duration::from_secs(config.runner.timeout_secs),
        );

        Self {
            name: config.job.name.clone(),
            pending: Vec::new(),
            queue,
            results,
            pool,
            parser,
            sink,
        }
    }

    /// Consumes a new job name; results of the next run persist under it.
    pub fn name_with(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Appends URLs to the pending set for the next run.
    pub fn urls_with<I, S>(&mut self, urls: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending
            .extend(urls.into_iter().map(|url| Job::new(url.into())));
        self
    }

    /// Replaces the parse collaborator for subsequent runs.
    pub fn parse_with(&mut self, parser: Arc<dyn ParseResponse>) -> &mut Self {
        self.parser = parser;
        self
    }

    /// Runs rounds until the job set converges or the run is stuck, then
    /// persists all three result collections and resets the shared state.
    ///
    /// Returns the run report; a persistence failure is logged and surfaced
    /// as the error, after the engine state has already been reset.
    pub async fn run_until_done(&mut self) -> crate::Result<RunReport> {
        let started_at = Utc::now();
        let mut previous_snapshot: Option<Vec<String>> = None;
        let mut rounds: u32 = 0;

        let outcome = loop {
            // Seeding: fold the previous round's error jobs back into the
            // pending set. Jobs move out of the set and into the queue in
            // one step, so a queued job is never double-accounted here.
            self.pending.extend(self.results.error_jobs());

            if self.pending.is_empty() {
                break RunOutcome::Completed;
            }

            let mut snapshot: Vec<String> =
                self.pending.iter().map(|job| job.url.clone()).collect();
            snapshot.sort_unstable();
            if previous_snapshot.as_ref() == Some(&snapshot) {
                tracing::warn!(
                    "no distinct progress since the previous round ({} jobs), aborting as stuck",
                    snapshot.len()
                );
                break RunOutcome::Stuck;
            }
            previous_snapshot = Some(snapshot);

            // Error records are retried from scratch; only a stuck round
            // carries them through to persistence.
            self.results.clear_errors();

            rounds += 1;
            tracing::info!("round {} started with {} jobs", rounds, self.pending.len());

            self.results.begin_round(self.pending.len());
            for job in self.pending.drain(..) {
                self.queue.enqueue(job);
            }

            // Draining: every job of the round is fetched and accounted for.
            self.queue.await_drain().await;

            // Parsing: single-threaded, workers are idle at this point.
            self.parse_round();
        };

        let counts = self.results.counts();
        match outcome {
            RunOutcome::Completed => tracing::info!(
                "finished after {} rounds: {} data, {} fetch errors, {} parse errors",
                rounds,
                counts.data,
                counts.fetch_errors,
                counts.parse_errors
            ),
            RunOutcome::Stuck => tracing::warn!(
                "stuck after {} rounds: {} data, {} fetch errors, {} parse errors",
                rounds,
                counts.data,
                counts.fetch_errors,
                counts.parse_errors
            ),
        }

        // Terminal: persist everything, then leave the engine empty for the
        // next logical run.
        let results = self.results.take_all();
        self.pending.clear();

        let report = RunReport {
            name: self.name.clone(),
            outcome,
            rounds,
            data: results.data.len(),
            fetch_errors: results.fetch_errors.len(),
            parse_errors: results.parse_errors.len(),
            started_at,
            finished_at: Utc::now(),
        };

        if let Err(e) = self.sink.persist(&self.name, &results) {
            tracing::error!("failed to persist results for job '{}': {}", self.name, e);
            return Err(e.into());
        }

        Ok(report)
    }

    /// Parse stage: one pass over the round's buffered responses.
    ///
    /// Failures are isolated per item: one malformed response never aborts
    /// the stage.
    fn parse_round(&self) {
        let responses = self.results.take_responses();
        let total = responses.len();
        tracing::info!("parsing {} responses", total);

        for (index, page) in responses.iter().enumerate() {
            match self.parser.parse(page) {
                Ok(records) => self.results.push_records(records),
                Err(e) => {
                    tracing::debug!("parse failed for {}: {:#}", page.url, e);
                    self.results.push_parse_error(ParseErrorRecord {
                        url: page.url.clone(),
                        error: e.to_string(),
                        trace: Some(format!("{e:#}")),
                    });
                }
            }
            tracing::trace!("parsing... {}/{}", index + 1, total);
        }
    }

    /// Number of workers servicing the rounds.
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Stops the worker pool and waits for every worker to exit.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
