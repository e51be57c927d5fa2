//! Directory listing for picking an input dataset.

use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;
use crate::run_dir::absolutize;

/// One entry of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    /// Absolute path of the entry.
    pub path: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
}

/// List the entries of `path`, directories first, then by name.
///
/// A path that is not a directory yields an empty list. An empty path means
/// the working directory.
pub async fn list_dir(path: &Path) -> Result<Vec<FileEntry>, CoreError> {
    let path = if path.as_os_str().to_string_lossy().trim().is_empty() {
        Path::new(".")
    } else {
        path
    };
    let dir = absolutize(path)?;
    if !tokio::fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let entry_path = entry.path();
        // Follows symlinks, so a link to a directory is browsable.
        let is_dir = tokio::fs::metadata(&entry_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            path: entry_path.to_string_lossy().into_owned(),
            extension: extension_of(&entry_path),
        });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Dotted extension of `path` (`".sqlite"`), or `""`.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
