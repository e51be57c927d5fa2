//! Handlers for starting runs and listing their artifacts.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use temoa_gui_core::results::{list_results, ResultArtifact};
use temoa_gui_core::run_config::RunConfig;

use crate::error::AppResult;
use crate::state::AppState;

/// Path of the log stream clients should follow after starting a run.
pub const STATUS_URL: &str = "/ws/logs";

/// Response body for `POST /api/run`.
#[derive(Debug, Serialize)]
pub struct RunStarted {
    pub message: &'static str,
    pub run_id: String,
    /// Absolute path of the run directory.
    pub output_dir: String,
    pub status_url: &'static str,
}

/// POST /api/run
///
/// Accept a run and start it in the background. Progress is streamed on
/// [`STATUS_URL`]; returns 409 while another run is active and 400 for a
/// malformed body.
pub async fn start_run(
    State(state): State<AppState>,
    payload: Result<Json<RunConfig>, JsonRejection>,
) -> AppResult<Json<RunStarted>> {
    let Json(input) = payload?;
    // The job handle is dropped: runs are detached and report via the log.
    let started = state.runner.start(input)?;

    Ok(Json(RunStarted {
        message: "Run started",
        run_id: started.run_id,
        output_dir: started.output_dir.to_string_lossy().into_owned(),
        status_url: STATUS_URL,
    }))
}

/// GET /api/results/{run_id}
pub async fn get_results(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> AppResult<Json<Vec<ResultArtifact>>> {
    let artifacts = list_results(&state.config.output_dir, &run_id).await?;
    Ok(Json(artifacts))
}
