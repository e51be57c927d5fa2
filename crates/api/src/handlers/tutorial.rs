//! Tutorial dataset download.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use temoa_gui_core::run_dir::absolutize;
use temoa_gui_core::tutorial::{download_to, TUTORIAL_DB_FILE};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TutorialDownloaded {
    pub status: &'static str,
    /// Absolute path of the downloaded dataset.
    pub path: String,
}

/// POST /api/download_tutorial
///
/// Fetch the tutorial dataset into the assets directory, replacing any
/// previous copy only once the download is complete.
pub async fn download_tutorial(State(state): State<AppState>) -> AppResult<Json<TutorialDownloaded>> {
    let url = state
        .config
        .tutorial_url
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("TUTORIAL_URL is not configured".to_string()))?;

    let target = absolutize(&state.config.assets_dir.join(TUTORIAL_DB_FILE))?;
    download_to(&state.http_client, url, &target).await?;

    Ok(Json(TutorialDownloaded {
        status: "ok",
        path: target.to_string_lossy().into_owned(),
    }))
}
