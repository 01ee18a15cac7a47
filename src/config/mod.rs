//! Configuration module for anidump
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file the defaults reproduce the public
//! AniLibria endpoints and a `dump/` directory in the working directory.
//!
//! # Example
//!
//! ```no_run
//! use anidump::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("anidump.toml")).unwrap();
//! println!("Pausing {}ms between releases", config.crawler.request_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig, MIN_REQUEST_DELAY,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
