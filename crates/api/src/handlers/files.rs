//! Directory browsing for input selection.

use std::path::PathBuf;

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use temoa_gui_core::files::{list_dir, FileEntry};

use crate::error::AppResult;

/// Query parameters for `GET /api/files`.
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Directory to list (default: the server's working directory).
    pub path: Option<String>,
}

/// GET /api/files?path=...
///
/// Lists a local directory. Paths that are not directories give `[]`.
pub async fn list_files(Query(query): Query<ListFilesQuery>) -> AppResult<Json<Vec<FileEntry>>> {
    let path = PathBuf::from(query.path.as_deref().unwrap_or("."));
    let entries = list_dir(&path).await?;
    tracing::debug!(path = %path.display(), count = entries.len(), "Listed directory");
    Ok(Json(entries))
}
