/// All timestamps are local wall-clock time, matching the run id format.
pub type Timestamp = chrono::DateTime<chrono::Local>;

/// Run identifiers are directory names under the output root.
pub type RunId = String;
