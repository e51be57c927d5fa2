#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use temoa_gui_api::config::ServerConfig;
use temoa_gui_api::router::build_app_router;
use temoa_gui_api::state::AppState;
use temoa_gui_api::ws::WsManager;

/// Build a test `ServerConfig` rooted in `root`.
///
/// Output and assets live under `root`, the engine is `true` (exits 0
/// without output), solver detection uses a missing interpreter, and the
/// settle delay is zero.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        output_dir: root.join("output"),
        assets_dir: root.join("assets"),
        static_dir: None,
        engine_program: "true".to_string(),
        engine_args: String::new(),
        engine_python: "/nonexistent/python3".to_string(),
        solver_probe_timeout_secs: 1,
        log_settle_ms: 0,
        tutorial_url: None,
        skip_cert_verify: false,
    }
}

/// Build the full application router for `config`.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack. The state is returned too so tests can
/// inspect the runner and the listener registry.
pub fn build_test_app(config: ServerConfig) -> (Router, AppState) {
    std::fs::create_dir_all(&config.output_dir).expect("create output dir");
    let ws_manager = Arc::new(WsManager::new());
    let state = AppState::new(config.clone(), ws_manager).expect("state");
    (build_app_router(state.clone(), &config), state)
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request without a body.
pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
