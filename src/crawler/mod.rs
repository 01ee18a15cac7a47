//! Crawler module for building the dump
//!
//! This module contains the core dump logic, including:
//! - HTTP fetching of JSON documents and binary files
//! - Sitemap parsing and release identifier extraction
//! - Per-release ingestion into the dump and catalogs
//! - Phase orchestration, pacing and reporting

mod coordinator;
mod fetcher;
mod ingest;
mod record;
mod sitemap;

pub use coordinator::{run_dump, Coordinator, RunSummary};
pub use fetcher::{build_http_client, Fetcher};
pub use ingest::Ingestor;
pub use record::{ReleaseFields, ReleaseRecord};
pub use sitemap::{parse_sitemap, release_identifier};

use crate::config::Config;
use crate::DumpError;

/// Runs a complete dump
///
/// This is the main entry point for building a dump. It will:
/// 1. Create the dump directory layout
/// 2. Download the sitemap (once)
/// 3. Derive the resume list from the sitemap (once)
/// 4. Ingest every pending release, pausing after each one
/// 5. Write the run report
///
/// # Arguments
///
/// * `config` - The dump configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Dump completed
/// * `Err(DumpError)` - Dump aborted
pub async fn dump(config: Config) -> Result<RunSummary, DumpError> {
    run_dump(config).await
}
