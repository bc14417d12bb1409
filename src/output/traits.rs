//! Persistence sink trait and output error types

use crate::engine::ScrapeResults;
use thiserror::Error;

/// Errors that can occur while persisting results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Capability interface for persisting a finished run
///
/// Called exactly once per terminal transition, for both converged and
/// stuck runs; no partial result is ever discarded. A failure here is
/// reported to the caller but never re-enters the engine's state machine.
pub trait Persist: Send + Sync {
    fn persist(&self, name: &str, results: &ScrapeResults) -> OutputResult<()>;
}
