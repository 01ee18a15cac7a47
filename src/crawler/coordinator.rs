//! Crawler coordinator - main dump orchestration logic
//!
//! A dump runs five phases in order. Each of the first three is skipped when
//! its output already exists on disk, so an interrupted dump can simply be
//! started again:
//!
//! 1. Ensure the directory layout
//! 2. Ensure the cached sitemap
//! 3. Ensure the resume list (`releases.txt`)
//! 4. Ingest every listed release not yet in the completion log
//! 5. Write `report.json`
//!
//! A release that fails to ingest is recorded and skipped; it stays out of
//! the completion log and is retried by the next run. Failures in any other
//! phase abort the run.

use crate::config::{Config, MIN_REQUEST_DELAY};
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::ingest::Ingestor;
use crate::crawler::sitemap::parse_sitemap;
use crate::output::CrawlReport;
use crate::state::{ReleaseFailure, ReleaseOutcome, RunState};
use crate::storage::{self, DumpLayout};
use crate::DumpError;
use chrono::Utc;
use std::time::Duration;
use url::Url;

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The report written to `report.json`
    pub report: CrawlReport,

    /// Identifiers skipped because an earlier run ingested them
    pub already_complete: u64,

    /// Identifiers that failed this run
    pub failures: Vec<ReleaseFailure>,
}

/// Main dump coordinator structure
pub struct Coordinator {
    layout: DumpLayout,
    fetcher: Fetcher,
    ingestor: Ingestor,
    sitemap_url: String,
    request_delay: Duration,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The dump configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(DumpError)` - An endpoint URL is invalid or the client failed to build
    pub fn new(config: Config) -> Result<Self, DumpError> {
        let client = build_http_client(&config.user_agent, &config.crawler).map_err(|source| {
            DumpError::Network {
                url: config.source.api_url.clone(),
                source,
            }
        })?;
        let fetcher = Fetcher::new(client);

        let layout = DumpLayout::new(&config.output.dump_dir);
        let api_url = parse_url(&config.source.api_url)?;
        let poster_base_url = parse_url(&config.source.poster_base_url)?;
        let ingestor = Ingestor::new(fetcher.clone(), layout.clone(), api_url, poster_base_url);

        Ok(Self {
            layout,
            fetcher,
            ingestor,
            sitemap_url: config.source.sitemap_url,
            request_delay: Duration::from_millis(
                config.crawler.request_delay.max(MIN_REQUEST_DELAY),
            ),
        })
    }

    pub fn layout(&self) -> &DumpLayout {
        &self.layout
    }

    /// Runs every phase of the dump
    pub async fn run(&self) -> Result<RunSummary, DumpError> {
        let start_time = std::time::Instant::now();
        tracing::info!("Starting dump in {}", self.layout.root().display());

        self.ensure_layout().await?;
        self.ensure_sitemap().await?;
        self.ensure_resume_list().await?;

        let mut state = RunState::new();
        self.ingest_releases(&mut state).await?;

        let report = self.emit_report(&state).await?;

        tracing::info!(
            "Dump completed: {} releases ingested, {} failed in {:?}",
            state.ingested(),
            state.failures().len(),
            start_time.elapsed()
        );

        Ok(RunSummary {
            report,
            already_complete: state.already_complete(),
            failures: state.failures().to_vec(),
        })
    }

    /// Creates the dump root, catalog and release directories
    pub async fn ensure_layout(&self) -> Result<(), DumpError> {
        for dir in self.layout.directories() {
            if !storage::exists(&dir).await? {
                storage::ensure_dir(&dir).await?;
                tracing::info!("Created {}", dir.display());
            }
        }
        Ok(())
    }

    /// Downloads the sitemap unless a cached copy exists
    ///
    /// The body lands in `sitemap.xml.part` and only becomes the cached
    /// `sitemap.xml` once it parses, so an error page or a cut-off transfer
    /// is fetched again by the next run.
    pub async fn ensure_sitemap(&self) -> Result<(), DumpError> {
        let path = self.layout.sitemap_file();
        if storage::exists(&path).await? {
            tracing::debug!("Using cached sitemap {}", path.display());
            return Ok(());
        }

        let part = self.layout.sitemap_part_file();
        self.fetcher.fetch_to_file(&self.sitemap_url, &part).await?;
        parse_sitemap(&storage::read_to_string(&part).await?)?;
        storage::rename(&part, &path).await?;

        tracing::info!("sitemap.xml downloaded");
        Ok(())
    }

    /// Derives the resume list from the sitemap unless it already exists
    pub async fn ensure_resume_list(&self) -> Result<(), DumpError> {
        let path = self.layout.resume_file();
        if storage::exists(&path).await? {
            tracing::debug!("Using existing resume list {}", path.display());
            return Ok(());
        }

        let sitemap = storage::read_to_string(&self.layout.sitemap_file()).await?;
        let identifiers = parse_sitemap(&sitemap)?;
        storage::write(&path, identifiers.join("\n")).await?;

        tracing::info!("releases.txt created with {} releases", identifiers.len());
        Ok(())
    }

    /// Ingests every pending identifier of the resume list, in order
    pub async fn ingest_releases(&self, state: &mut RunState) -> Result<(), DumpError> {
        let identifiers = storage::read_lines(&self.layout.resume_file()).await?;
        let mut completed = storage::load_completed(&self.layout).await?;

        let pending = identifiers
            .iter()
            .filter(|id| !completed.contains(id.as_str()))
            .count();
        tracing::info!("{} releases listed, {} pending", identifiers.len(), pending);

        for identifier in &identifiers {
            let outcome = if completed.contains(identifier) {
                state.record_outcome(identifier, ReleaseOutcome::AlreadyComplete, None);
                ReleaseOutcome::AlreadyComplete
            } else {
                match self.ingestor.ingest(identifier, state).await {
                    Ok(_) => {
                        storage::mark_completed(&self.layout, identifier).await?;
                        completed.insert(identifier.clone());
                        state.record_outcome(identifier, ReleaseOutcome::Ingested, None);
                        ReleaseOutcome::Ingested
                    }
                    Err(e) => {
                        tracing::error!("Failed to ingest release {}: {}", identifier, e);
                        state.record_outcome(
                            identifier,
                            ReleaseOutcome::Failed,
                            Some(e.to_string()),
                        );
                        ReleaseOutcome::Failed
                    }
                }
            };
            tracing::debug!("Release {}: {}", identifier, outcome);

            // Pace the remote API after every attempt
            if outcome.touched_network() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        Ok(())
    }

    /// Writes `report.json` for this run, replacing any previous report
    pub async fn emit_report(&self, state: &RunState) -> Result<CrawlReport, DumpError> {
        let report = CrawlReport::from_state(state, Utc::now());
        report.write_to(&self.layout.report_file()).await?;
        tracing::info!(
            "Report written: {} releases, {} catalogs",
            report.releases_in_dump,
            report.available_catalogs.len()
        );
        Ok(report)
    }
}

fn parse_url(url: &str) -> Result<Url, DumpError> {
    Url::parse(url).map_err(|source| DumpError::Url {
        url: url.to_string(),
        source,
    })
}

/// Runs the main dump operation
///
/// # Arguments
///
/// * `config` - The dump configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - All phases completed (individual releases may have failed)
/// * `Err(DumpError)` - A phase failed and the run was aborted
///
/// # Example
///
/// ```no_run
/// use anidump::config::Config;
/// use anidump::crawler::run_dump;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_dump(Config::default()).await?;
/// println!("{} releases ingested", summary.report.releases_in_dump);
/// # Ok(())
/// # }
/// ```
pub async fn run_dump(config: Config) -> Result<RunSummary, DumpError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
