use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/solvers
///
/// Solvers the engine can use on this machine. Never fails: detection
/// problems yield a default list.
pub async fn list_solvers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.solver_probe.available().await)
}
