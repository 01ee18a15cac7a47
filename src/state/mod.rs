//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ReleaseOutcome`: what happened to one identifier (ingested, skipped, failed)
//! - `RunState`: seen catalog tags, counters and failures for the current run

mod outcome;
mod run_state;

// Re-export main types
pub use outcome::ReleaseOutcome;
pub use run_state::{ReleaseFailure, RunState};
