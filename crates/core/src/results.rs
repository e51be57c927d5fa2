//! Output artifacts of a finished run.

use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;
use crate::run_dir::existing_run_dir;

/// Extensions surfaced to the GUI; everything else in a run directory is
/// internal to the engine.
pub const ARTIFACT_EXTENSIONS: &[&str] = &["html", "svg", "sqlite", "xlsx"];

/// URL prefix under which the output root is served.
pub const RESULTS_URL_PREFIX: &str = "/results";

/// A downloadable or viewable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultArtifact {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// List the artifacts of run `run_id`, sorted by file name.
pub async fn list_results(output_root: &Path, run_id: &str) -> Result<Vec<ResultArtifact>, CoreError> {
    let run_dir = existing_run_dir(output_root, run_id)?;

    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&run_dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(names
        .into_iter()
        .filter_map(|name| artifact_for(run_id, name))
        .collect())
}

fn artifact_for(run_id: &str, name: String) -> Option<ResultArtifact> {
    let path = Path::new(&name);
    let ext = path.extension()?.to_str()?;
    if !ARTIFACT_EXTENSIONS.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;

    let label = match ext {
        "html" if name.contains("Network_Graph") => network_map_label(stem),
        "xlsx" => format!("Export: {name}"),
        "sqlite" => format!("Database: {name}"),
        _ => name.clone(),
    };

    Some(ResultArtifact {
        url: format!("{RESULTS_URL_PREFIX}/{run_id}/{name}"),
        kind: ext.to_string(),
        label,
        name,
    })
}

/// `Network_Graph_..._2030` becomes `Network Map 2030`.
fn network_map_label(stem: &str) -> String {
    match stem.rsplit('_').next() {
        Some(year) if !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()) => {
            format!("Network Map {year}")
        }
        _ => "Network Map".to_string(),
    }
}
