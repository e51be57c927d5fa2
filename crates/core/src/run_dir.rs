//! Directory-per-run layout under the output root.
//!
//! A run id is the local start time (`YYYYMMDD_HHMMSS`). Two runs started in
//! the same second get `_2`, `_3`, ... suffixes so they never share a
//! directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;
use crate::types::{RunId, Timestamp};

/// File name of the engine configuration written into every run directory.
pub const RUN_CONFIG_FILE: &str = "run_config.toml";

/// Format of the timestamp part of a run id.
const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A freshly created run directory.
#[derive(Debug, Clone)]
pub struct RunDir {
    pub id: RunId,
    pub path: PathBuf,
}

impl RunDir {
    /// Path of the engine configuration file inside this run directory.
    pub fn config_path(&self) -> PathBuf {
        self.path.join(RUN_CONFIG_FILE)
    }
}

/// Create a new, uniquely named run directory under `output_root`.
///
/// The output root itself is created if missing.
pub fn create_run_dir(output_root: &Path, started_at: Timestamp) -> Result<RunDir, CoreError> {
    std::fs::create_dir_all(output_root)?;
    let base = started_at.format(RUN_ID_FORMAT).to_string();

    let mut attempt = 1u32;
    loop {
        let id = if attempt == 1 {
            base.clone()
        } else {
            format!("{base}_{attempt}")
        };
        let path = output_root.join(&id);
        match std::fs::create_dir(&path) {
            Ok(()) => {
                let path = absolutize(&path)?;
                tracing::debug!(run_id = %id, path = %path.display(), "Created run directory");
                return Ok(RunDir { id, path });
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Check that a client-supplied run id names a single directory entry.
pub fn validate_run_id(run_id: &str) -> Result<(), CoreError> {
    let mut components = Path::new(run_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == run_id => Ok(()),
        _ => Err(CoreError::Validation(format!("Invalid run id: {run_id}"))),
    }
}

/// Resolve the directory of an existing run.
pub fn existing_run_dir(output_root: &Path, run_id: &str) -> Result<PathBuf, CoreError> {
    validate_run_id(run_id)?;
    let path = output_root.join(run_id);
    if !path.is_dir() {
        return Err(CoreError::NotFound {
            entity: "Run",
            id: run_id.to_string(),
        });
    }
    Ok(path)
}

/// Make `path` absolute against the current directory without touching
/// symlinks.
pub fn absolutize(path: &Path) -> Result<PathBuf, CoreError> {
    Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> Timestamp {
        chrono::Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn run_id_is_formatted_timestamp() {
        let root = tempfile::tempdir().expect("tempdir");
        let run = create_run_dir(root.path(), fixed_time()).expect("create");
        assert_eq!(run.id, "20240309_140507");
        assert!(run.path.is_dir());
        assert!(run.path.is_absolute());
        assert_eq!(run.config_path(), run.path.join("run_config.toml"));
    }

    #[test]
    fn same_second_runs_get_distinct_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let first = create_run_dir(root.path(), fixed_time()).expect("first");
        let second = create_run_dir(root.path(), fixed_time()).expect("second");
        let third = create_run_dir(root.path(), fixed_time()).expect("third");
        assert_eq!(first.id, "20240309_140507");
        assert_eq!(second.id, "20240309_140507_2");
        assert_eq!(third.id, "20240309_140507_3");
    }

    #[test]
    fn missing_output_root_is_created() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("a").join("b");
        let run = create_run_dir(&nested, fixed_time()).expect("create");
        assert!(run.path.starts_with(std::path::absolute(&nested).unwrap()));
    }

    #[test]
    fn traversal_run_ids_are_rejected() {
        for bad in ["..", ".", "a/b", "../etc", "", "/abs"] {
            assert_matches!(validate_run_id(bad), Err(CoreError::Validation(_)), "{bad}");
        }
        assert!(validate_run_id("20240309_140507").is_ok());
    }

    #[test]
    fn unknown_run_is_not_found() {
        let root = tempfile::tempdir().expect("tempdir");
        assert_matches!(
            existing_run_dir(root.path(), "nonexistent_run"),
            Err(CoreError::NotFound { entity: "Run", .. })
        );
    }
}
