/// Release outcome definitions for tracking crawl progress
///
/// This module defines what can happen to one identifier from the resume list.
use std::fmt;

/// What happened to one identifier during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseOutcome {
    /// Metadata, poster and catalog entries were written
    Ingested,

    /// Listed in the completion log by an earlier run; nothing fetched
    AlreadyComplete,

    /// One of the ingestion steps failed; the identifier stays pending
    Failed,
}

impl ReleaseOutcome {
    /// Returns true if a request was made to the remote API
    pub fn touched_network(&self) -> bool {
        !matches!(self, Self::AlreadyComplete)
    }

    /// Returns the outcome name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingested => "ingested",
            Self::AlreadyComplete => "already_complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReleaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
