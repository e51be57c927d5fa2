use std::path::PathBuf;
use std::time::Duration;

use temoa_gui_core::runner::{EngineCommand, RunnerSettings};
use temoa_gui_core::tutorial::TlsPolicy;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running the panel locally next to
/// an engine installation.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory holding one subdirectory per run.
    pub output_dir: PathBuf,
    /// Directory with the config template and the tutorial dataset.
    pub assets_dir: PathBuf,
    /// Optional built frontend served for unmatched routes.
    pub static_dir: Option<PathBuf>,
    /// Engine executable.
    pub engine_program: String,
    /// Engine argument template (`{config}` and `{output}` placeholders).
    pub engine_args: String,
    /// Python interpreter of the engine installation, used for solver discovery.
    pub engine_python: String,
    /// Solver discovery timeout in seconds (default: `10`).
    pub solver_probe_timeout_secs: u64,
    /// Pause between the opening log lines and the run itself, in milliseconds.
    pub log_settle_ms: u64,
    /// Source of the tutorial dataset. Downloads are refused when unset.
    pub tutorial_url: Option<String>,
    /// Disable TLS certificate verification for downloads.
    pub skip_cert_verify: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                          |
    /// |-----------------------------|----------------------------------|
    /// | `HOST`                      | `0.0.0.0`                        |
    /// | `PORT`                      | `8000`                           |
    /// | `CORS_ORIGINS`              | `*`                              |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                             |
    /// | `OUTPUT_DIR`                | `output`                         |
    /// | `ASSETS_DIR`                | `assets`                         |
    /// | `STATIC_DIR`                | unset                            |
    /// | `ENGINE_PROGRAM`            | `temoa`                          |
    /// | `ENGINE_ARGS`               | `run {config} --output {output}` |
    /// | `ENGINE_PYTHON`             | `python3`                        |
    /// | `SOLVER_PROBE_TIMEOUT_SECS` | `10`                             |
    /// | `LOG_SETTLE_MS`             | `1000`                           |
    /// | `TUTORIAL_URL`              | unset                            |
    /// | `TEMOA_SKIP_CERT_VERIFY`    | unset (`1` disables checks)      |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let solver_probe_timeout_secs: u64 = env_or("SOLVER_PROBE_TIMEOUT_SECS", "10")
            .parse()
            .expect("SOLVER_PROBE_TIMEOUT_SECS must be a valid u64");

        let log_settle_ms: u64 = env_or("LOG_SETTLE_MS", "1000")
            .parse()
            .expect("LOG_SETTLE_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            output_dir: env_or("OUTPUT_DIR", "output").into(),
            assets_dir: env_or("ASSETS_DIR", "assets").into(),
            static_dir: env_opt("STATIC_DIR").map(PathBuf::from),
            engine_program: env_or("ENGINE_PROGRAM", "temoa"),
            engine_args: env_or("ENGINE_ARGS", "run {config} --output {output}"),
            engine_python: env_or("ENGINE_PYTHON", "python3"),
            solver_probe_timeout_secs,
            log_settle_ms,
            tutorial_url: env_opt("TUTORIAL_URL"),
            skip_cert_verify: std::env::var("TEMOA_SKIP_CERT_VERIFY").as_deref() == Ok("1"),
        }
    }

    /// Settings handed to the job runner.
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            output_root: self.output_dir.clone(),
            assets_dir: self.assets_dir.clone(),
            engine: EngineCommand::from_template(&self.engine_program, &self.engine_args),
            settle_delay: Duration::from_millis(self.log_settle_ms),
        }
    }

    pub fn solver_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.solver_probe_timeout_secs)
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        TlsPolicy::from_skip_flag(self.skip_cert_verify)
    }

    /// Whether CORS should accept any origin.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
