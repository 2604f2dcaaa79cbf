//! Results artifact: one pretty-printed JSON document per run.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::error::{BenchError, Result};
use crate::report::{BenchmarkReport, BenchmarkResult, ReportSummary};

/// File name prefix of results artifacts.
pub const ARTIFACT_PREFIX: &str = "benchmark_";

/// Attempts at finding a free file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Evaluators enabled for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunFlags {
    pub llm_judge_enabled: bool,
    pub execution_eval_enabled: bool,
}

#[derive(Serialize)]
struct Artifact<'a> {
    summary: ReportSummary,
    timestamp: String,
    config: RunFlags,
    details: &'a [BenchmarkResult],
}

/// Writes `report` to `<dir>/benchmark_<YYYYMMDD_HHMMSS>.json`, creating `dir`.
///
/// Returns the path written.
pub fn save_report(report: &BenchmarkReport, flags: RunFlags, dir: &Path) -> Result<PathBuf> {
    save_report_at(report, flags, dir, Local::now())
}

pub(crate) fn save_report_at(
    report: &BenchmarkReport,
    flags: RunFlags,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        BenchError::persistence(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
    let artifact = Artifact {
        summary: report.summary(),
        timestamp: timestamp.clone(),
        config: flags,
        details: report.results(),
    };
    let json = serde_json::to_string_pretty(&artifact)
        .map_err(|e| BenchError::persistence(format!("Failed to serialize results: {}", e)))?;

    let (path, mut file) = create_unique(dir, &timestamp)?;
    file.write_all(json.as_bytes()).map_err(|e| {
        BenchError::persistence(format!("Failed to write {}: {}", path.display(), e))
    })?;

    info!("Results saved to: {}", path.display());
    Ok(path)
}

/// Creates a file that did not exist before, suffixing `_1`, `_2`, ... on collision.
fn create_unique(dir: &Path, timestamp: &str) -> Result<(PathBuf, fs::File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{ARTIFACT_PREFIX}{timestamp}.json")
        } else {
            format!("{ARTIFACT_PREFIX}{timestamp}_{attempt}.json")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(BenchError::persistence(format!(
                    "Failed to create {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    Err(BenchError::persistence(format!(
        "No free artifact name for {} in {}",
        timestamp,
        dir.display()
    )))
}
