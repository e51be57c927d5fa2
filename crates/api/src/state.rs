use std::sync::Arc;

use temoa_gui_core::runner::JobRunner;
use temoa_gui_core::solvers::SolverProbe;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Log listeners (browser clients on `/ws/logs`).
    pub ws_manager: Arc<WsManager>,
    /// Launches optimization runs and publishes their logs to `ws_manager`.
    pub runner: Arc<JobRunner>,
    pub solver_probe: Arc<SolverProbe>,
    /// Client for the tutorial download, built with the configured TLS policy.
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Wire up the runner, probe and HTTP client from `config`.
    pub fn new(
        config: ServerConfig,
        ws_manager: Arc<WsManager>,
    ) -> Result<Self, temoa_gui_core::error::CoreError> {
        let runner = JobRunner::new(config.runner_settings(), ws_manager.clone());
        let solver_probe = SolverProbe::new(&config.engine_python, config.solver_probe_timeout());
        let http_client = temoa_gui_core::tutorial::build_client(
            config.tls_policy(),
            temoa_gui_core::tutorial::DOWNLOAD_TIMEOUT,
        )?;

        Ok(Self {
            config: Arc::new(config),
            ws_manager,
            runner: Arc::new(runner),
            solver_probe: Arc::new(solver_probe),
            http_client,
        })
    }
}
