//! Thread-safe FIFO job queue with a drain barrier
//!
//! The queue tracks two things independently of the result buffers:
//! - ready items, counted by a semaphore so `dequeue` can block without
//!   spinning
//! - outstanding jobs (enqueued but not yet marked done), published on a
//!   watch channel so `await_drain` can block until the round is fully
//!   accounted for
//!
//! A job that has been dequeued but is still in flight counts as
//! outstanding, so `await_drain` is a join barrier, not an emptiness check.

use crate::engine::types::Job;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{watch, Semaphore};

pub struct JobQueue {
    items: Mutex<VecDeque<Job>>,
    ready: Semaphore,
    outstanding: watch::Sender<usize>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Semaphore::new(0),
            outstanding,
        }
    }

    /// Appends a job to the tail of the queue. Never blocks.
    pub fn enqueue(&self, job: Job) {
        self.outstanding.send_modify(|n| *n += 1);
        self.items
            .lock()
            .expect("job queue mutex poisoned")
            .push_back(job);
        self.ready.add_permits(1);
    }

    /// Removes and returns the job at the head of the queue, waiting until
    /// one is available.
    ///
    /// Returns `None` once the queue has been closed; workers use this as
    /// their shutdown signal.
    pub async fn dequeue(&self) -> Option<Job> {
        let permit = self.ready.acquire().await.ok()?;
        // No await between the acquire and the pop, so a permit always
        // corresponds to a queued item.
        permit.forget();
        let job = self
            .items
            .lock()
            .expect("job queue mutex poisoned")
            .pop_front()
            .expect("semaphore permit issued without a queued job");
        Some(job)
    }

    /// Marks one previously dequeued job as fully processed.
    ///
    /// Every `dequeue` must be paired with exactly one `mark_done` for the
    /// drain barrier to release.
    pub fn mark_done(&self) {
        self.outstanding.send_modify(|n| {
            debug_assert!(*n > 0, "mark_done without an outstanding job");
            *n = n.saturating_sub(1);
        });
    }

    /// Blocks until every job enqueued so far has been dequeued and marked
    /// done.
    pub async fn await_drain(&self) {
        let mut rx = self.outstanding.subscribe();
        // The sender lives in self, so wait_for cannot fail while we hold
        // a reference.
        let _ = rx.wait_for(|outstanding| *outstanding == 0).await;
    }

    /// Closes the queue: blocked and future `dequeue` calls return `None`.
    pub fn close(&self) {
        self.ready.close();
    }

    /// Number of jobs currently queued (not counting in-flight jobs).
    pub fn len(&self) -> usize {
        self.items.lock().expect("job queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
