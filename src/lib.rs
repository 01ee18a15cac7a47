//! anidump: an incremental catalog dump of the AniLibria release database
//!
//! This crate fetches the site's sitemap, derives the list of release codes,
//! downloads metadata and a poster for each release, and maintains per-tag
//! catalog indexes (by release type and genre) on disk. Every phase is
//! resumable: rerunning a finished dump performs no network requests.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dump operations
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Invalid JSON in {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    #[error("Sitemap parse error: {0}")]
    Sitemap(String),

    #[error("Invalid release record for '{identifier}': {reason}")]
    InvalidRecord { identifier: String, reason: String },

    #[error("Invalid URL {url}: {source}")]
    Url {
        url: String,
        source: ::url::ParseError,
    },

    #[error("IO error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Coarse classification of a [`DumpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or connection failure
    Network,
    /// Malformed JSON, XML, URL or release record
    Parse,
    /// Read, write or mkdir failure
    Filesystem,
    /// Invalid or unreadable configuration
    Config,
}

impl DumpError {
    /// Returns the coarse category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Network { .. } => ErrorKind::Network,
            Self::Json { .. }
            | Self::Sitemap(_)
            | Self::InvalidRecord { .. }
            | Self::Url { .. } => ErrorKind::Parse,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for dump operations
pub type Result<T> = std::result::Result<T, DumpError>;

// Re-export commonly used types
pub use catalog::{CatalogEntry, CatalogIndex};
pub use config::Config;
pub use crawler::{dump, Coordinator, RunSummary};
pub use output::CrawlReport;
pub use state::RunState;
pub use storage::DumpLayout;
