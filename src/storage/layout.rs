//! Paths of every artifact in the dump tree

use std::path::{Path, PathBuf};

/// Resolves the on-disk locations of a dump
///
/// ```text
/// <root>/
///   sitemap.xml
///   releases.txt
///   completed.txt
///   report.json
///   catalogs/<tag>.json
///   release/<code>/data.json
///   release/<code>/poster.jpg
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLayout {
    root: PathBuf,
}

impl DumpLayout {
    /// Creates a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one JSON array per catalog tag
    pub fn catalogs_dir(&self) -> PathBuf {
        self.root.join("catalogs")
    }

    /// Directory holding one subdirectory per release code
    pub fn releases_dir(&self) -> PathBuf {
        self.root.join("release")
    }

    pub fn sitemap_file(&self) -> PathBuf {
        self.root.join("sitemap.xml")
    }

    /// Download target for the sitemap until it has been parsed
    pub fn sitemap_part_file(&self) -> PathBuf {
        self.root.join("sitemap.xml.part")
    }

    /// Newline-separated identifiers in crawl order
    pub fn resume_file(&self) -> PathBuf {
        self.root.join("releases.txt")
    }

    /// Identifiers already ingested by this or an earlier run
    pub fn completed_file(&self) -> PathBuf {
        self.root.join("completed.txt")
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join("report.json")
    }

    pub fn release_dir(&self, code: &str) -> PathBuf {
        self.releases_dir().join(code)
    }

    pub fn release_data_file(&self, code: &str) -> PathBuf {
        self.release_dir(code).join("data.json")
    }

    pub fn release_poster_file(&self, code: &str) -> PathBuf {
        self.release_dir(code).join("poster.jpg")
    }

    /// The directories created before anything else is written
    pub fn directories(&self) -> [PathBuf; 3] {
        [self.root.clone(), self.catalogs_dir(), self.releases_dir()]
    }
}
