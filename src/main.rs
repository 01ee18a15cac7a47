//! anidump main entry point
//!
//! This is the command-line interface for the anidump catalog crawler.

use anidump::config::load_config_or_default;
use anidump::crawler::dump;
use anidump::output::print_summary;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// anidump: an incremental dump of the AniLibria catalog
///
/// Downloads release metadata and posters listed in the site's sitemap and
/// groups releases into per-type and per-genre catalogs. Interrupted dumps
/// resume where they left off.
#[derive(Parser, Debug)]
#[command(name = "anidump")]
#[command(version)]
#[command(about = "An incremental dump of the AniLibria catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or resume the dump
    Dump,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Dump => handle_dump(config, cli.quiet).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("anidump=info,warn"),
            1 => EnvFilter::new("anidump=debug,info"),
            2 => EnvFilter::new("anidump=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `dump` subcommand
async fn handle_dump(config: anidump::Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Dumping {} into {}",
        config.source.sitemap_url,
        config.output.dump_dir
    );

    let summary = dump(config).await.context("Dump failed")?;

    if !quiet {
        print_summary(&summary);
        println!("\nDump complete");
    }

    Ok(())
}
