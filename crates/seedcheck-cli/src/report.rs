use std::fs::{OpenOptions, create_dir_all};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use seedcheck_core::TestResult;

/// Artifact written by `seedcheck run --out`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    /// Redacted connection target.
    pub database: String,
    pub aborted: bool,
    pub result: TestResult,
}

impl RunReport {
    pub fn new(
        run_id: &str,
        started_at: DateTime<Utc>,
        database: String,
        aborted: bool,
        result: TestResult,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            started_at: started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            database,
            aborted,
            result,
        }
    }
}

pub fn write_report(path: &Path, report: &RunReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, report).map_err(std::io::Error::from)
}
