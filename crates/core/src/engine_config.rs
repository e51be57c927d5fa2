//! Engine run configuration (`run_config.toml`).
//!
//! The engine reads a TOML file naming its input and output databases plus
//! the solver settings chosen in the GUI. How that file is seeded depends on
//! the kind of input the user picked:
//!
//! - a SQLite dataset starts from the bundled template (when present) and
//!   writes results back into the same database;
//! - a TOML file is used as-is, keeping its formatting and comments;
//! - anything else is passed through as a database path with a warning.

use std::path::{Path, PathBuf};

use toml_edit::{value, DocumentMut, Item};

use crate::error::CoreError;
use crate::log_sink::{publish, LogSink};
use crate::run_config::RunConfig;
use crate::run_dir::absolutize;

/// Template file name looked up in the assets directory for SQLite inputs.
pub const TEMPLATE_FILE: &str = "tutorial_config.toml";

const KEY_INPUT_DATABASE: &str = "input_database";
const KEY_OUTPUT_DATABASE: &str = "output_database";

/// The kind of dataset selected as run input, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Sqlite,
    Toml,
    Unknown,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("sqlite") | Some("db") => Self::Sqlite,
            Some("toml") => Self::Toml,
            _ => Self::Unknown,
        }
    }
}

/// A built engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub document: DocumentMut,
}

impl EngineConfig {
    /// Display form of the configured output database.
    pub fn output_database(&self) -> String {
        item_display(self.document.get(KEY_OUTPUT_DATABASE))
    }

    /// Serialize and write the configuration to `path`.
    pub async fn write_to(&self, path: &Path) -> Result<(), CoreError> {
        tokio::fs::write(path, self.document.to_string()).await?;
        Ok(())
    }
}

/// Build the engine configuration for `run`.
///
/// `assets_dir` is searched for [`TEMPLATE_FILE`] when the input is a
/// SQLite dataset. Progress is narrated to `log` as it happens, so the input
/// kind is reported even when reading the input fails.
pub async fn build(
    run: &RunConfig,
    assets_dir: &Path,
    log: &dyn LogSink,
) -> Result<EngineConfig, CoreError> {
    let input_path = PathBuf::from(&run.input_database);
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| run.input_database.clone());

    let mut document = match InputKind::of(&input_path) {
        InputKind::Sqlite => {
            publish(log, format!("Input is SQLite: {file_name}")).await;
            let mut doc = load_template(assets_dir).await?;
            set_databases(&mut doc, &input_path)?;
            publish(log, "Output will be saved back to the input database.").await;
            doc
        }
        InputKind::Toml => {
            publish(log, format!("Input is TOML: {file_name}")).await;
            let mut doc = parse_file(&input_path).await?;
            if !doc.contains_key(KEY_OUTPUT_DATABASE) {
                let input_db = doc.get(KEY_INPUT_DATABASE).cloned().ok_or_else(|| {
                    CoreError::Validation(format!(
                        "{} does not define {KEY_INPUT_DATABASE}",
                        input_path.display()
                    ))
                })?;
                doc[KEY_OUTPUT_DATABASE] = input_db;
            }
            doc
        }
        InputKind::Unknown => {
            let ext = input_path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            publish(
                log,
                format!("⚠️ Unknown input file type: {ext}. Attempting to proceed."),
            )
            .await;
            let mut doc = DocumentMut::new();
            set_databases(&mut doc, &input_path)?;
            doc
        }
    };

    document["scenario_mode"] = value(run.scenario_mode.as_str());
    document["solver_name"] = value(run.solver_name.as_str());
    document["time_sequencing"] = value(run.time_sequencing.as_str());

    Ok(EngineConfig { document })
}

async fn load_template(assets_dir: &Path) -> Result<DocumentMut, CoreError> {
    let template = assets_dir.join(TEMPLATE_FILE);
    if tokio::fs::try_exists(&template).await.unwrap_or(false) {
        parse_file(&template).await
    } else {
        tracing::debug!(path = %template.display(), "No config template, starting empty");
        Ok(DocumentMut::new())
    }
}

async fn parse_file(path: &Path) -> Result<DocumentMut, CoreError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        CoreError::Validation(format!("Cannot read {}: {e}", path.display()))
    })?;
    text.parse::<DocumentMut>()
        .map_err(|e| CoreError::Validation(format!("Invalid TOML in {}: {e}", path.display())))
}

fn set_databases(doc: &mut DocumentMut, input_path: &Path) -> Result<(), CoreError> {
    let absolute = absolutize(input_path)?.to_string_lossy().into_owned();
    doc[KEY_INPUT_DATABASE] = value(absolute.as_str());
    doc[KEY_OUTPUT_DATABASE] = value(absolute);
    Ok(())
}

fn item_display(item: Option<&Item>) -> String {
    match item {
        Some(item) => match item.as_str() {
            Some(s) => s.to_string(),
            None => item.to_string().trim().to_string(),
        },
        None => String::new(),
    }
}
