//! Filesystem primitives used by the dump pipeline
//!
//! Thin async wrappers over `tokio::fs` that attach the offending path to
//! every I/O failure.

use crate::DumpError;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Returns whether `path` exists
pub async fn exists(path: &Path) -> Result<bool, DumpError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DumpError::fs(path, e))
}

/// Creates `path` and any missing parents; existing directories are fine
pub async fn ensure_dir(path: &Path) -> Result<(), DumpError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DumpError::fs(path, e))
}

pub async fn read_to_string(path: &Path) -> Result<String, DumpError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DumpError::fs(path, e))
}

/// Writes `contents` to `path`, replacing any previous file
pub async fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), DumpError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| DumpError::fs(path, e))
}

/// Moves `from` to `to`, replacing any file already at `to`
pub async fn rename(from: &Path, to: &Path) -> Result<(), DumpError> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| DumpError::fs(from, e))
}

/// Appends one line to `path`, creating the file if needed
pub async fn append_line(path: &Path, line: &str) -> Result<(), DumpError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| DumpError::fs(path, e))?;

    file.write_all(format!("{}\n", line).as_bytes())
        .await
        .map_err(|e| DumpError::fs(path, e))?;
    file.flush().await.map_err(|e| DumpError::fs(path, e))
}

/// Serializes `value` as JSON indented with tabs
pub fn to_tabbed_json<T: serde::Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Reads a newline-delimited list, trimming each line and dropping blanks
pub async fn read_lines(path: &Path) -> Result<Vec<String>, DumpError> {
    let content = read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
