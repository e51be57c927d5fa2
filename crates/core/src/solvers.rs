//! Solver discovery.
//!
//! The engine drives its solvers through Pyomo, so availability is decided
//! by asking the engine's Python interpreter which of the known solvers
//! Pyomo can load. Any failure falls back to [`FALLBACK_SOLVERS`].

use std::time::Duration;

use tokio::process::Command;

use crate::subprocess::run_captured;

/// Solvers offered in the GUI, in display order.
pub const KNOWN_SOLVERS: &[&str] = &[
    "appsi_highs",
    "highs",
    "cbc",
    "glpk",
    "ipopt",
    "gurobi",
    "cplex",
];

/// Returned when detection fails or finds nothing.
pub const FALLBACK_SOLVERS: &[&str] = &["appsi_highs", "cbc"];

/// Prints a JSON array of the names in `sys.argv[1:]` that Pyomo reports as
/// available. Individual solver checks may raise; those count as missing.
const PROBE_SCRIPT: &str = r#"
import json, sys
import pyomo.environ as pyo
found = []
for name in sys.argv[1:]:
    try:
        if pyo.SolverFactory(name).available(exception_flag=False):
            found.append(name)
    except Exception:
        pass
print(json.dumps(found))
"#;

/// Detects solvers through a Python interpreter.
#[derive(Debug, Clone)]
pub struct SolverProbe {
    python: String,
    timeout: Duration,
}

impl SolverProbe {
    pub fn new(python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }

    /// Available solvers in [`KNOWN_SOLVERS`] order, or the fallback list.
    pub async fn available(&self) -> Vec<String> {
        match self.probe().await {
            Ok(found) if !found.is_empty() => found,
            Ok(_) => {
                tracing::info!("No solvers detected, using fallback list");
                fallback()
            }
            Err(reason) => {
                tracing::warn!(python = %self.python, %reason, "Solver probe failed, using fallback list");
                fallback()
            }
        }
    }

    async fn probe(&self) -> Result<Vec<String>, String> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-c").arg(PROBE_SCRIPT).args(KNOWN_SOLVERS);

        let output = run_captured(&mut cmd, self.timeout)
            .await
            .map_err(|e| e.to_string())?;
        if output.exit_code != 0 {
            return Err(format!(
                "exit code {}: {}",
                output.exit_code,
                output.stderr.trim()
            ));
        }
        parse_probe_output(&output.stdout)
    }
}

fn fallback() -> Vec<String> {
    FALLBACK_SOLVERS.iter().map(|s| s.to_string()).collect()
}

/// Parse the probe's JSON output, keeping known names in display order.
///
/// Only the last non-empty line is parsed so import-time chatter on stdout
/// does not break detection.
fn parse_probe_output(stdout: &str) -> Result<Vec<String>, String> {
    let last = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| "empty probe output".to_string())?;
    let reported: Vec<String> =
        serde_json::from_str(last.trim()).map_err(|e| format!("bad probe output: {e}"))?;

    Ok(KNOWN_SOLVERS
        .iter()
        .filter(|known| reported.iter().any(|r| r == *known))
        .map(|s| s.to_string())
        .collect())
}
