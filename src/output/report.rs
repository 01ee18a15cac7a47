//! The `report.json` written at the end of every run

use crate::state::RunState;
use crate::storage::{to_tabbed_json, write};
use crate::DumpError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of one run, persisted as `report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    /// Releases ingested by this run
    pub releases_in_dump: u64,

    /// Completion time in milliseconds since the Unix epoch
    pub dump_created_at: i64,

    /// Distinct catalog tags touched by this run
    pub available_catalogs: Vec<String>,
}

impl CrawlReport {
    /// Builds the report for `state`, stamped with `created_at`
    pub fn from_state(state: &RunState, created_at: DateTime<Utc>) -> Self {
        Self {
            releases_in_dump: state.ingested(),
            dump_created_at: created_at.timestamp_millis(),
            available_catalogs: state.catalogs().map(str::to_string).collect(),
        }
    }

    /// Writes the report to `path`, replacing any previous one
    pub async fn write_to(&self, path: &Path) -> Result<(), DumpError> {
        let bytes = to_tabbed_json(self).map_err(|e| DumpError::json("report", e))?;
        write(path, bytes).await
    }
}
