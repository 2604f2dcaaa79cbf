//! Benchmark orchestration.
//!
//! A [`Benchmark`] owns the data loader, the generator under test and the
//! optional evaluators. `run` loads the dataset, draws a deterministic sample,
//! evaluates each example in sequence and folds the outcome into a
//! [`BenchmarkReport`]. Per-example failures land in the result record; only
//! load and persistence failures abort a run.

mod progress;

pub use progress::{final_report_lines, progress_line, ProgressSink, SilentProgress, TracingProgress};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::dataset::{DataLoader, DatasetExample};
use crate::error::{BenchError, Result};
use crate::eval::{ExecutionEvaluator, Judge, JudgeVerdict};
use crate::pipeline::SqlGenerator;
use crate::report::{save_report, BenchmarkReport, BenchmarkResult, RunFlags};
use crate::sql::{exact_match, SqlValidator};

/// Reasoning recorded when the judge is skipped for unparseable SQL.
const INVALID_SQL_REASONING: &str = "Predicted SQL is not valid";

/// Where a benchmark is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Configured,
    Loading,
    Sampling,
    Evaluating,
    Reporting,
    Persisting,
    Finished,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Loading => "loading",
            Self::Sampling => "sampling",
            Self::Evaluating => "evaluating",
            Self::Reporting => "reporting",
            Self::Persisting => "persisting",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: BenchmarkReport,
    /// Path of the results artifact, when saving was enabled.
    pub artifact: Option<PathBuf>,
}

/// Builder for [`Benchmark`].
pub struct BenchmarkBuilder {
    loader: DataLoader,
    generator: Option<Arc<dyn SqlGenerator>>,
    execution: Option<ExecutionEvaluator>,
    judge: Option<Arc<dyn Judge>>,
    progress: Arc<dyn ProgressSink>,
    options: RunConfig,
}

impl BenchmarkBuilder {
    /// Registers the generator under test. Required.
    pub fn generator<G>(mut self, generator: G) -> Self
    where
        G: SqlGenerator + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn shared_generator(mut self, generator: Arc<dyn SqlGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Enables execution-accuracy evaluation.
    pub fn execution(mut self, evaluator: ExecutionEvaluator) -> Self {
        self.execution = Some(evaluator);
        self
    }

    /// Enables semantic judging.
    pub fn judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Sample size, seed, progress interval and persistence settings.
    pub fn options(mut self, options: RunConfig) -> Self {
        self.options = options;
        self
    }

    /// Validates the configuration.
    ///
    /// Fails when no generator is registered or the progress interval is zero.
    pub fn build(self) -> Result<Benchmark> {
        let generator = self
            .generator
            .ok_or_else(|| BenchError::config("no SQL generator registered"))?;

        if self.options.progress_interval == 0 {
            return Err(BenchError::config("progress interval must be at least 1"));
        }

        Ok(Benchmark {
            loader: self.loader,
            generator,
            execution: self.execution,
            judge: self.judge,
            progress: self.progress,
            options: self.options,
            validator: SqlValidator::new(),
            phase: RunPhase::Configured,
        })
    }
}

/// A configured benchmark run.
pub struct Benchmark {
    loader: DataLoader,
    generator: Arc<dyn SqlGenerator>,
    execution: Option<ExecutionEvaluator>,
    judge: Option<Arc<dyn Judge>>,
    progress: Arc<dyn ProgressSink>,
    options: RunConfig,
    validator: SqlValidator,
    phase: RunPhase,
}

impl Benchmark {
    pub fn builder(loader: DataLoader) -> BenchmarkBuilder {
        BenchmarkBuilder {
            loader,
            generator: None,
            execution: None,
            judge: None,
            progress: Arc::new(TracingProgress),
            options: RunConfig::default(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Evaluators enabled for this benchmark.
    pub fn flags(&self) -> RunFlags {
        RunFlags {
            llm_judge_enabled: self.judge.is_some(),
            execution_eval_enabled: self.execution.is_some(),
        }
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(from = %self.phase, to = %phase, "benchmark phase");
        self.phase = phase;
    }

    /// Runs the benchmark end to end.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.enter(RunPhase::Loading);
        self.loader.load()?;
        info!(
            "Loaded {} examples across {} databases",
            self.loader.example_count(),
            self.loader.database_count()
        );

        self.enter(RunPhase::Sampling);
        let samples: Vec<DatasetExample> = self
            .loader
            .get_samples(
                self.options.samples,
                self.options.shuffle,
                self.options.seed,
            )
            .into_iter()
            .cloned()
            .collect();
        let total = samples.len();
        if total < self.options.samples {
            debug!(
                requested = self.options.samples,
                available = total,
                "sample request clamped to dataset size"
            );
        }

        self.enter(RunPhase::Evaluating);
        let flags = self.flags();
        self.progress.on_start(total, flags);

        let mut report = BenchmarkReport::new();
        for (index, example) in samples.iter().enumerate() {
            let result = self.evaluate_example(example).await;
            report.record(result);

            let done = index + 1;
            if done % self.options.progress_interval == 0 {
                self.progress.on_progress(done, total, &report, flags);
            }
        }

        self.enter(RunPhase::Reporting);
        self.progress.on_finish(&report, flags);

        let artifact = if self.options.save_results {
            self.enter(RunPhase::Persisting);
            Some(save_report(&report, flags, &self.options.output_dir)?)
        } else {
            None
        };

        self.enter(RunPhase::Finished);
        Ok(RunOutcome { report, artifact })
    }

    /// Evaluates one example. Never fails: errors are recorded on the result.
    pub async fn evaluate_example(&self, example: &DatasetExample) -> BenchmarkResult {
        let schema = self.loader.get_schema(&example.db_id);

        let started = Instant::now();
        let generated = self.generator.generate(&example.question, schema).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let predicted_sql = match generated {
            Ok(sql) => sql,
            Err(e) => {
                warn!(db_id = %example.db_id, "generator failed: {}", e);
                return BenchmarkResult::failed(
                    &example.question,
                    &example.db_id,
                    &example.gold_sql,
                    e.to_string(),
                    latency_ms,
                );
            }
        };

        let mut result = BenchmarkResult::predicted(
            &example.question,
            &example.db_id,
            &example.gold_sql,
            predicted_sql,
            latency_ms,
        );
        result.exact_match = exact_match(&example.gold_sql, &result.predicted_sql);
        result.is_valid_sql = self.validator.is_valid(&result.predicted_sql);

        if let Some(judge) = &self.judge {
            self.apply_judge(judge.as_ref(), &mut result).await;
        }

        if let Some(evaluator) = &self.execution {
            let verdict = evaluator
                .evaluate(&result.gold_sql, &result.predicted_sql, &result.db_id)
                .await;
            debug!(db_id = %result.db_id, "execution: {}", verdict.message());
            result.execution_match = verdict.matched();
        }

        result
    }

    async fn apply_judge(&self, judge: &dyn Judge, result: &mut BenchmarkResult) {
        let verdict = if result.exact_match {
            JudgeVerdict::exact_match()
        } else if !result.is_valid_sql {
            // Not judged: stays out of the judge denominators.
            result.llm_judge_match = None;
            result.llm_judge_score = 0;
            result.llm_judge_reasoning = INVALID_SQL_REASONING.to_string();
            return;
        } else {
            match judge
                .judge(&result.question, &result.gold_sql, &result.predicted_sql)
                .await
            {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(db_id = %result.db_id, "judge failed: {}", e);
                    let detail = match e {
                        BenchError::Judge(message) => message,
                        other => other.to_string(),
                    };
                    result.llm_judge_match = None;
                    result.llm_judge_score = 0;
                    result.llm_judge_reasoning = format!("Judge error: {detail}");
                    return;
                }
            }
        };

        result.llm_judge_match = Some(verdict.is_equivalent);
        result.llm_judge_score = verdict.score;
        result.llm_judge_reasoning = verdict.reasoning;
    }
}
