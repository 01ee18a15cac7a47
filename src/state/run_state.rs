//! Per-run crawl state
//!
//! Created when a run starts, threaded through every ingestion, and turned
//! into the report when the run ends. Nothing here outlives the process.

use crate::state::ReleaseOutcome;
use std::collections::BTreeSet;

/// A release that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    pub identifier: String,
    pub message: String,
}

/// Accumulated state of one run
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Every catalog tag an entry was registered under
    seen_catalogs: BTreeSet<String>,

    /// Releases ingested by this run
    ingested: u64,

    /// Releases skipped because an earlier run completed them
    already_complete: u64,

    failures: Vec<ReleaseFailure>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an entry was registered under `tag`
    pub fn record_catalog(&mut self, tag: &str) {
        if !self.seen_catalogs.contains(tag) {
            self.seen_catalogs.insert(tag.to_string());
        }
    }

    /// Records the outcome for one identifier
    pub fn record_outcome(
        &mut self,
        identifier: &str,
        outcome: ReleaseOutcome,
        message: Option<String>,
    ) {
        match outcome {
            ReleaseOutcome::Ingested => self.ingested += 1,
            ReleaseOutcome::AlreadyComplete => self.already_complete += 1,
            ReleaseOutcome::Failed => self.failures.push(ReleaseFailure {
                identifier: identifier.to_string(),
                message: message.unwrap_or_default(),
            }),
        }
    }

    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn already_complete(&self) -> u64 {
        self.already_complete
    }

    pub fn failures(&self) -> &[ReleaseFailure] {
        &self.failures
    }

    /// Distinct catalog tags seen this run, sorted
    pub fn catalogs(&self) -> impl Iterator<Item = &str> {
        self.seen_catalogs.iter().map(String::as_str)
    }

    pub fn catalog_count(&self) -> usize {
        self.seen_catalogs.len()
    }
}
