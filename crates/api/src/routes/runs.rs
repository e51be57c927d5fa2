//! Route definitions for launching runs and listing their results.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Run routes, merged into `api_routes()`.
///
/// ```text
/// POST   /run                 -> start_run
/// GET    /results/{run_id}    -> get_results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(runs::start_run))
        .route("/results/{run_id}", get(runs::get_results))
}
