//! Fixed-size pool of long-lived fetch workers
//!
//! Each worker loops: dequeue a job, call the fetch collaborator with the
//! configured timeout, record the outcome in the shared buffers, mark the
//! job done. Workers never terminate between rounds; the same pool services
//! every round of a run and every run of the scraper's lifetime, until
//! `shutdown` closes the queue and joins them.

use crate::engine::queue::JobQueue;
use crate::engine::results::ResultAggregator;
use crate::fetch::Fetch;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    queue: Arc<JobQueue>,
}

impl WorkerPool {
    /// Spawns `concurrency` workers against the given queue and buffers.
    pub fn spawn(
        concurrency: usize,
        queue: Arc<JobQueue>,
        results: Arc<ResultAggregator>,
        fetcher: Arc<dyn Fetch>,
        timeout: Duration,
    ) -> Self {
        let handles = (0..concurrency)
            .map(|worker_id| {
                let queue = Arc::clone(&queue);
                let results = Arc::clone(&results);
                let fetcher = Arc::clone(&fetcher);
                tokio::spawn(async move {
                    worker_loop(worker_id, queue, results, fetcher, timeout).await;
                })
            })
            .collect();

        Self { handles, queue }
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Closes the job queue and waits for every worker to exit.
    pub async fn shutdown(self) {
        self.queue.close();
        for handle in self.handles {
            // Workers only exit by returning; a join error here means one
            // panicked, which is a bug worth surfacing in the log.
            if let Err(e) = handle.await {
                tracing::error!("worker task failed during shutdown: {}", e);
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<JobQueue>,
    results: Arc<ResultAggregator>,
    fetcher: Arc<dyn Fetch>,
    timeout: Duration,
) {
    tracing::debug!("worker {} started", worker_id);

    while let Some(job) = queue.dequeue().await {
        // The fetch happens with no lock held; the guard is only taken for
        // the O(1) append when recording the outcome. A panicking fetch
        // collaborator is caught here so the job still lands in the
        // fetch-error buffer and the round barrier still counts it down;
        // otherwise the round would never drain.
        let outcome = AssertUnwindSafe(fetcher.fetch(&job, timeout))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(page)) => {
                tracing::debug!("worker {} fetched {}", worker_id, job);
                results.record_response(page);
            }
            Ok(Err(e)) => {
                tracing::debug!("worker {} failed {}: {}", worker_id, job, e);
                results.record_fetch_error(&job, e.to_string());
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("worker {} panicked fetching {}: {}", worker_id, job, message);
                results.record_fetch_error(&job, format!("fetch panicked: {message}"));
            }
        }
        queue.mark_done();
    }

    tracing::debug!("worker {} stopped", worker_id);
}

/// Extracts a readable message from a caught panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
