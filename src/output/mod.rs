//! Output module for run reports
//!
//! This module handles:
//! - Building and persisting `report.json`
//! - Printing the human-readable run summary

mod report;
pub mod stats;

pub use report::CrawlReport;
pub use stats::{format_summary, print_summary};
