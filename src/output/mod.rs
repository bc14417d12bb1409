//! Output module: persistence sinks and run reporting
//!
//! The engine hands its three result collections to a [`Persist`]
//! implementation at every terminal transition. [`JsonSink`] is the stock
//! implementation, writing one JSON file per collection.

mod json;
pub mod stats;
mod traits;

pub use json::JsonSink;
pub use stats::print_report;
pub use traits::{OutputError, OutputResult, Persist};
