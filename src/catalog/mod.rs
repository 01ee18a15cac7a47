//! Catalog indexes
//!
//! A catalog is a JSON array of [`CatalogEntry`] values stored at
//! `catalogs/<tag>.json`, newest entry first. Tags come from a release's type
//! and genres. Every append is a full read-modify-write of the tag's file;
//! callers must not append to the same tag concurrently.

use crate::storage::{exists, read_to_string, to_tabbed_json, write};
use crate::DumpError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Type tag used when a release has no type
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Genre tag used when a release lists no genres, or an empty one
pub const UNKNOWN_GENRE: &str = "UNKNOWN_GENRE";

/// Pointer to a release stored in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Russian title of the release
    pub name: String,

    /// Release code, also the directory name under `release/`
    pub code: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Append-only per-tag catalog files in one directory
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    dir: PathBuf,
}

impl CatalogIndex {
    /// Creates an index over `dir`, which must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves the file backing `tag`
    ///
    /// Path separators in a tag are replaced so a tag can never escape the
    /// catalog directory.
    pub fn path_for(&self, tag: &str) -> PathBuf {
        let file_name: String = tag
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    /// Prepends `entry` to the catalog for `tag`
    ///
    /// A missing catalog is created holding just `entry`. An existing one is
    /// read, parsed, and rewritten as `[entry, ...previous]`.
    pub async fn append(&self, tag: &str, entry: &CatalogEntry) -> Result<(), DumpError> {
        let path = self.path_for(tag);

        let entries = if exists(&path).await? {
            let mut previous = self.read_path(tag, &path).await?;
            previous.insert(0, entry.clone());
            previous
        } else {
            vec![entry.clone()]
        };

        let bytes =
            to_tabbed_json(&entries).map_err(|e| DumpError::json(format!("catalog {}", tag), e))?;
        write(&path, bytes).await?;

        tracing::debug!(
            "Catalog {} now holds {} entries (added {})",
            tag,
            entries.len(),
            entry.code
        );
        Ok(())
    }

    /// Reads the catalog for `tag`; a missing catalog is empty
    pub async fn read(&self, tag: &str) -> Result<Vec<CatalogEntry>, DumpError> {
        let path = self.path_for(tag);
        if !exists(&path).await? {
            return Ok(Vec::new());
        }
        self.read_path(tag, &path).await
    }

    async fn read_path(&self, tag: &str, path: &Path) -> Result<Vec<CatalogEntry>, DumpError> {
        let source = read_to_string(path).await?;
        serde_json::from_str(&source).map_err(|e| DumpError::json(format!("catalog {}", tag), e))
    }
}
