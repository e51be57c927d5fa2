pub mod health;
pub mod runs;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// ```text
/// /files?path=...                  GET   list a directory
/// /solvers                         GET   detect available solvers
/// /run                             POST  start a run
/// /results/{run_id}                GET   list run artifacts
/// /download_tutorial               POST  fetch the tutorial dataset
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/solvers", get(handlers::solvers::list_solvers))
        .merge(runs::router())
        .route(
            "/download_tutorial",
            post(handlers::tutorial::download_tutorial),
        )
}

/// Root-level WebSocket routes.
///
/// ```text
/// /ws/logs                         live run log
/// ```
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/logs", get(ws::ws_handler))
}
