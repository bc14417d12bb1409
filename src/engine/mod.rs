//! Scrape engine: bounded worker pool with round-based retry
//!
//! This module contains the concurrent core of the crate:
//! - A thread-safe FIFO job queue with a drain barrier
//! - A fixed-size pool of long-lived fetch workers
//! - Shared result buffers behind a single guard
//! - The convergence driver that seeds, drains, parses and evaluates rounds
//!   until the job set empties or stops making progress

mod driver;
mod pool;
mod queue;
mod results;
mod types;

pub use driver::Scraper;
pub use pool::WorkerPool;
pub use queue::JobQueue;
pub use results::{Counts, ResultAggregator};
pub use types::{
    FetchErrorRecord, FetchedPage, Job, ParseErrorRecord, RunOutcome, RunReport, ScrapeResults,
};
