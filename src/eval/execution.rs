//! Execution-accuracy evaluation.
//!
//! Runs the gold and the predicted query against the example's SQLite
//! database and compares canonicalized result sets. Every failure mode is
//! reported as a value; nothing here returns an error to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::config::ExecutionConfig;
use crate::db::{self, Row};
use crate::error::{BenchError, Result};

/// Default per-query timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default database file extension.
const DEFAULT_EXTENSION: &str = "sqlite";

/// File stem tried when `<db_id>.<ext>` is absent.
const FALLBACK_FILE_STEM: &str = "database";

/// Outcome of running one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The statement ran; all fetched rows.
    Rows(Vec<Row>),
    /// The database was missing or the statement failed.
    Failed(String),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rows(_))
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Failed(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rows(_) => None,
            Self::Failed(message) => Some(message),
        }
    }
}

/// Three-way result of comparing a gold and a predicted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionVerdict {
    /// The gold query itself failed; the example is not scored.
    GoldFailed { message: String },
    /// The gold query ran but the predicted one did not.
    PredictedFailed { message: String },
    /// Both ran and their result sets were compared.
    Compared { matched: bool, message: String },
}

impl ExecutionVerdict {
    /// Returns false only when the gold query could not be executed.
    pub fn could_execute(&self) -> bool {
        !matches!(self, Self::GoldFailed { .. })
    }

    /// The execution match, or `None` when the example is not scored.
    pub fn matched(&self) -> Option<bool> {
        match self {
            Self::GoldFailed { .. } => None,
            Self::PredictedFailed { .. } => Some(false),
            Self::Compared { matched, .. } => Some(*matched),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::GoldFailed { message }
            | Self::PredictedFailed { message }
            | Self::Compared { message, .. } => message,
        }
    }
}

/// Evaluates SQL by executing it against per-database SQLite files.
///
/// Databases live at `<root>/<db_id>/<db_id>.<ext>`, falling back to
/// `<root>/<db_id>/database.<ext>`.
#[derive(Debug, Clone)]
pub struct ExecutionEvaluator {
    databases_dir: PathBuf,
    extension: String,
    timeout: Duration,
}

impl ExecutionEvaluator {
    /// Creates an evaluator rooted at `databases_dir` with default settings.
    pub fn new(databases_dir: impl Into<PathBuf>) -> Self {
        Self {
            databases_dir: databases_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Creates an evaluator from the `[execution]` config section.
    pub fn from_config(config: &ExecutionConfig) -> Result<Self> {
        let databases_dir = config.databases_dir.clone().ok_or_else(|| {
            BenchError::config("Execution evaluation requires a databases directory")
        })?;
        Ok(Self::new(databases_dir)
            .with_extension(config.extension.clone())
            .with_timeout(config.timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn databases_dir(&self) -> &Path {
        &self.databases_dir
    }

    /// Resolves the database file for `db_id`, if one exists.
    pub fn database_path(&self, db_id: &str) -> Option<PathBuf> {
        let db_dir = self.databases_dir.join(db_id);
        [db_id, FALLBACK_FILE_STEM]
            .into_iter()
            .map(|stem| db_dir.join(format!("{stem}.{}", self.extension)))
            .find(|path| path.is_file())
    }

    /// Executes `sql` with the evaluator's timeout.
    pub async fn execute(&self, sql: &str, db_id: &str) -> QueryOutcome {
        self.execute_with_timeout(sql, db_id, self.timeout).await
    }

    /// Executes `sql` against the database for `db_id` on a fresh connection.
    pub async fn execute_with_timeout(
        &self,
        sql: &str,
        db_id: &str,
        timeout: Duration,
    ) -> QueryOutcome {
        let Some(path) = self.database_path(db_id) else {
            return QueryOutcome::Failed(format!("Database not found: {db_id}"));
        };

        match db::fetch_rows(&path, sql, timeout).await {
            Ok(rows) => {
                debug!("Query on {} returned {} rows", db_id, rows.len());
                QueryOutcome::Rows(rows)
            }
            Err(BenchError::Query(message)) => QueryOutcome::Failed(format!("SQL Error: {message}")),
            Err(e) => QueryOutcome::Failed(format!("Execution Error: {e}")),
        }
    }

    /// Canonicalizes a result set into one comparable string.
    ///
    /// Cells are stringified, lower-cased and trimmed; rows are sorted. Row
    /// order therefore does not matter, column order does.
    pub fn normalize_results(rows: &[Row]) -> String {
        let mut normalized: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| value.to_cell_string().to_lowercase().trim().to_string())
                    .collect()
            })
            .collect();
        normalized.sort();
        format!("{normalized:?}")
    }

    /// Returns true if two result sets canonicalize identically.
    pub fn results_match(left: &[Row], right: &[Row]) -> bool {
        Self::normalize_results(left) == Self::normalize_results(right)
    }

    /// Compares the gold and predicted queries by execution.
    pub async fn evaluate(&self, gold_sql: &str, predicted_sql: &str, db_id: &str) -> ExecutionVerdict {
        let gold_rows = match self.execute(gold_sql, db_id).await {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Failed(message) => {
                return ExecutionVerdict::GoldFailed {
                    message: format!("Gold query failed: {message}"),
                }
            }
        };

        let predicted_rows = match self.execute(predicted_sql, db_id).await {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Failed(message) => {
                return ExecutionVerdict::PredictedFailed {
                    message: format!("Predicted query failed: {message}"),
                }
            }
        };

        if Self::results_match(&gold_rows, &predicted_rows) {
            ExecutionVerdict::Compared {
                matched: true,
                message: "Results match".to_string(),
            }
        } else {
            ExecutionVerdict::Compared {
                matched: false,
                message: format!(
                    "Results differ (gold: {} rows, predicted: {} rows)",
                    gold_rows.len(),
                    predicted_rows.len()
                ),
            }
        }
    }
}
