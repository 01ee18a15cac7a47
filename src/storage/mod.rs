//! Storage module for the on-disk dump
//!
//! This module handles:
//! - Resolving every artifact path from the dump root
//! - Filesystem primitives (existence, mkdir, read, write, append)
//! - The per-identifier completion log used to resume interrupted runs

mod files;
mod layout;

pub use files::{
    append_line, ensure_dir, exists, read_lines, read_to_string, rename, to_tabbed_json, write,
};
pub use layout::DumpLayout;

use crate::DumpError;
use std::collections::HashSet;

/// Loads the set of identifiers already ingested
///
/// A missing completion log means nothing has been ingested yet.
pub async fn load_completed(layout: &DumpLayout) -> Result<HashSet<String>, DumpError> {
    let path = layout.completed_file();
    if !exists(&path).await? {
        return Ok(HashSet::new());
    }

    Ok(read_lines(&path).await?.into_iter().collect())
}

/// Records `identifier` as ingested
pub async fn mark_completed(layout: &DumpLayout, identifier: &str) -> Result<(), DumpError> {
    append_line(&layout.completed_file(), identifier).await
}
