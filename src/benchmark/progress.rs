//! Progress reporting for benchmark runs.
//!
//! The benchmark calls a [`ProgressSink`] at three points: once before the
//! first example, every `progress_interval` examples, and once after the
//! last. Sinks only format; they never touch the report.

use tracing::info;

use crate::report::{BenchmarkReport, RunFlags};

const RULE_WIDTH: usize = 60;

/// Receives run lifecycle notifications.
pub trait ProgressSink: Send + Sync {
    /// Called once with the number of sampled examples and the enabled evaluators.
    fn on_start(&self, total: usize, flags: RunFlags);

    /// Called after `done` of `total` examples have been recorded.
    fn on_progress(&self, done: usize, total: usize, report: &BenchmarkReport, flags: RunFlags);

    /// Called once after the last example.
    fn on_finish(&self, report: &BenchmarkReport, flags: RunFlags);
}

/// Sink that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_start(&self, total: usize, flags: RunFlags) {
        info!("Running benchmark on {} samples...", total);
        if flags.llm_judge_enabled {
            info!("  LLM Judge: enabled");
        }
        if flags.execution_eval_enabled {
            info!("  Execution Eval: enabled");
        }
    }

    fn on_progress(&self, done: usize, total: usize, report: &BenchmarkReport, flags: RunFlags) {
        info!("{}", progress_line(done, total, report, flags));
    }

    fn on_finish(&self, report: &BenchmarkReport, flags: RunFlags) {
        for line in final_report_lines(report, flags) {
            info!("{}", line);
        }
    }
}

/// Sink that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_start(&self, _total: usize, _flags: RunFlags) {}

    fn on_progress(
        &self,
        _done: usize,
        _total: usize,
        _report: &BenchmarkReport,
        _flags: RunFlags,
    ) {
    }

    fn on_finish(&self, _report: &BenchmarkReport, _flags: RunFlags) {}
}

/// One-line running summary, e.g. `[10/50] EM: 40.0% | Errors: 1`.
///
/// The judge column is shown whenever the judge is enabled, even before the
/// first verdict.
pub fn progress_line(
    done: usize,
    total: usize,
    report: &BenchmarkReport,
    flags: RunFlags,
) -> String {
    let em = report.exact_match_accuracy() * 100.0;
    if flags.llm_judge_enabled {
        format!(
            "[{}/{}] EM: {:.1}% | LLM Judge: {:.1}% | Errors: {}",
            done,
            total,
            em,
            report.llm_judge_accuracy() * 100.0,
            report.error_count()
        )
    } else {
        format!(
            "[{}/{}] EM: {:.1}% | Errors: {}",
            done,
            total,
            em,
            report.error_count()
        )
    }
}

/// Final results block, one entry per line.
pub fn final_report_lines(report: &BenchmarkReport, flags: RunFlags) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "BENCHMARK RESULTS".to_string(),
        rule.clone(),
        format!("  Total Samples:       {}", report.total_samples()),
        format!(
            "  Exact Match:         {:.2}%",
            report.exact_match_accuracy() * 100.0
        ),
    ];

    if flags.llm_judge_enabled {
        lines.push(format!(
            "  LLM Judge Match:     {:.2}%",
            report.llm_judge_accuracy() * 100.0
        ));
        lines.push(format!(
            "  LLM Judge Avg Score: {:.2}/5",
            report.llm_judge_avg_score()
        ));
    }

    if flags.execution_eval_enabled {
        lines.push(format!(
            "  Execution Match:     {:.2}%",
            report.execution_accuracy() * 100.0
        ));
    }

    lines.push(format!(
        "  Valid SQL Rate:      {:.2}%",
        report.valid_sql_rate() * 100.0
    ));
    lines.push(format!("  Errors:              {}", report.error_count()));
    lines.push(format!(
        "  Avg Latency:         {:.0}ms",
        report.avg_latency_ms()
    ));
    lines.push(rule);
    lines
}
