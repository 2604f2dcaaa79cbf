//! Per-example results and the aggregate benchmark report.
//!
//! The report is append-only. Every counter is derived from the result that
//! is recorded, so counters always agree with the result list; ratios are
//! computed on read.

mod persist;

pub use persist::{save_report, RunFlags, ARTIFACT_PREFIX};

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one dataset example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub question: String,
    pub db_id: String,
    pub gold_sql: String,
    /// Empty when the generator failed.
    pub predicted_sql: String,
    pub exact_match: bool,
    /// `None` when execution evaluation was disabled or the gold query could not run.
    pub execution_match: Option<bool>,
    /// `None` when judging was disabled or the judge failed.
    pub llm_judge_match: Option<bool>,
    pub llm_judge_score: u8,
    pub llm_judge_reasoning: String,
    pub is_valid_sql: bool,
    pub error: Option<String>,
    pub latency_ms: f64,
}

impl BenchmarkResult {
    /// Result for an example whose generator call succeeded.
    pub fn predicted(
        question: impl Into<String>,
        db_id: impl Into<String>,
        gold_sql: impl Into<String>,
        predicted_sql: impl Into<String>,
        latency_ms: f64,
    ) -> Self {
        Self {
            question: question.into(),
            db_id: db_id.into(),
            gold_sql: gold_sql.into(),
            predicted_sql: predicted_sql.into(),
            exact_match: false,
            execution_match: None,
            llm_judge_match: None,
            llm_judge_score: 0,
            llm_judge_reasoning: String::new(),
            is_valid_sql: false,
            error: None,
            latency_ms,
        }
    }

    /// Result for an example whose generator call failed.
    pub fn failed(
        question: impl Into<String>,
        db_id: impl Into<String>,
        gold_sql: impl Into<String>,
        error: impl Into<String>,
        latency_ms: f64,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::predicted(question, db_id, gold_sql, "", latency_ms)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary metrics as written to the results artifact.
///
/// Accuracies and rates are percentages; every float is rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_samples: usize,
    pub exact_match_accuracy: f64,
    pub execution_accuracy: f64,
    pub llm_judge_accuracy: f64,
    pub llm_judge_avg_score: f64,
    pub valid_sql_rate: f64,
    pub error_count: usize,
    pub avg_latency_ms: f64,
}

/// Running aggregate over recorded results.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    total_samples: usize,
    exact_match_count: usize,
    execution_match_count: usize,
    executed_count: usize,
    llm_judge_match_count: usize,
    llm_judge_total_score: u64,
    judged_count: usize,
    valid_sql_count: usize,
    error_count: usize,
    total_latency_ms: f64,
    results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result and updates the counters its fields select.
    pub fn record(&mut self, result: BenchmarkResult) {
        self.total_samples += 1;
        self.total_latency_ms += result.latency_ms;

        if result.exact_match {
            self.exact_match_count += 1;
        }
        if result.is_valid_sql {
            self.valid_sql_count += 1;
        }
        if result.is_error() {
            self.error_count += 1;
        }
        if let Some(matched) = result.execution_match {
            self.executed_count += 1;
            if matched {
                self.execution_match_count += 1;
            }
        }
        if let Some(matched) = result.llm_judge_match {
            self.judged_count += 1;
            self.llm_judge_total_score += u64::from(result.llm_judge_score);
            if matched {
                self.llm_judge_match_count += 1;
            }
        }

        self.results.push(result);
    }

    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    pub fn exact_match_count(&self) -> usize {
        self.exact_match_count
    }

    pub fn execution_match_count(&self) -> usize {
        self.execution_match_count
    }

    /// Results whose execution comparison produced a verdict.
    pub fn executed_count(&self) -> usize {
        self.executed_count
    }

    pub fn llm_judge_match_count(&self) -> usize {
        self.llm_judge_match_count
    }

    pub fn llm_judge_total_score(&self) -> u64 {
        self.llm_judge_total_score
    }

    /// Results that carry a judge verdict.
    pub fn judged_count(&self) -> usize {
        self.judged_count
    }

    pub fn valid_sql_count(&self) -> usize {
        self.valid_sql_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn total_latency_ms(&self) -> f64 {
        self.total_latency_ms
    }

    pub fn exact_match_accuracy(&self) -> f64 {
        ratio(self.exact_match_count as f64, self.total_samples)
    }

    /// Matches over results where the gold query executed.
    pub fn execution_accuracy(&self) -> f64 {
        ratio(self.execution_match_count as f64, self.executed_count)
    }

    pub fn llm_judge_accuracy(&self) -> f64 {
        ratio(self.llm_judge_match_count as f64, self.judged_count)
    }

    /// Average judge score on the 0..=5 scale.
    pub fn llm_judge_avg_score(&self) -> f64 {
        ratio(self.llm_judge_total_score as f64, self.judged_count)
    }

    pub fn valid_sql_rate(&self) -> f64 {
        ratio(self.valid_sql_count as f64, self.total_samples)
    }

    pub fn avg_latency_ms(&self) -> f64 {
        ratio(self.total_latency_ms, self.total_samples)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_samples: self.total_samples,
            exact_match_accuracy: round2(self.exact_match_accuracy() * 100.0),
            execution_accuracy: round2(self.execution_accuracy() * 100.0),
            llm_judge_accuracy: round2(self.llm_judge_accuracy() * 100.0),
            llm_judge_avg_score: round2(self.llm_judge_avg_score()),
            valid_sql_rate: round2(self.valid_sql_rate() * 100.0),
            error_count: self.error_count,
            avg_latency_ms: round2(self.avg_latency_ms()),
        }
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
