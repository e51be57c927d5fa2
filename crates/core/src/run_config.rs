//! Run request submitted by the GUI.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default scenario mode passed to the engine.
pub const DEFAULT_SCENARIO_MODE: &str = "perfect_foresight";
/// Default solver name passed to the engine.
pub const DEFAULT_SOLVER_NAME: &str = "appsi_highs";
/// Default time sequencing passed to the engine.
pub const DEFAULT_TIME_SEQUENCING: &str = "seasonal_timeslices";

/// Settings for a single optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the input dataset (`.sqlite`, `.db` or `.toml`).
    pub input_database: String,
    #[serde(default = "default_scenario_mode")]
    pub scenario_mode: String,
    #[serde(default = "default_solver_name")]
    pub solver_name: String,
    #[serde(default = "default_time_sequencing")]
    pub time_sequencing: String,
    /// Accepted for compatibility; the server always picks the run directory.
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_scenario_mode() -> String {
    DEFAULT_SCENARIO_MODE.to_string()
}

fn default_solver_name() -> String {
    DEFAULT_SOLVER_NAME.to_string()
}

fn default_time_sequencing() -> String {
    DEFAULT_TIME_SEQUENCING.to_string()
}

impl RunConfig {
    /// Build a config for `input_database` with every other field defaulted.
    pub fn new(input_database: impl Into<String>) -> Self {
        Self {
            input_database: input_database.into(),
            scenario_mode: default_scenario_mode(),
            solver_name: default_solver_name(),
            time_sequencing: default_time_sequencing(),
            output_dir: None,
        }
    }

    /// Reject requests the engine could never run.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.input_database.trim().is_empty() {
            return Err(CoreError::Validation(
                "input_database is required".to_string(),
            ));
        }
        for (field, value) in [
            ("scenario_mode", &self.scenario_mode),
            ("solver_name", &self.solver_name),
            ("time_sequencing", &self.time_sequencing),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: RunConfig =
            serde_json::from_str(r#"{"input_database": "assets/tutorial_database.sqlite"}"#)
                .expect("deserialize");
        assert_eq!(config.scenario_mode, DEFAULT_SCENARIO_MODE);
        assert_eq!(config.solver_name, DEFAULT_SOLVER_NAME);
        assert_eq!(config.time_sequencing, DEFAULT_TIME_SEQUENCING);
        assert_eq!(config.output_dir, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_input_database_is_rejected() {
        let config = RunConfig::new("   ");
        assert_matches!(config.validate(), Err(CoreError::Validation(msg)) if msg.contains("input_database"));
    }

    #[test]
    fn blank_solver_is_rejected() {
        let mut config = RunConfig::new("db.sqlite");
        config.solver_name = String::new();
        assert_matches!(config.validate(), Err(CoreError::Validation(msg)) if msg.contains("solver_name"));
    }
}
