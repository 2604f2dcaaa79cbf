//! End-to-end benchmark runs over fixture datasets.

use std::collections::BTreeSet;
use std::sync::Arc;

use nl2sql_bench::benchmark::{Benchmark, SilentProgress};
use nl2sql_bench::config::RunConfig;
use nl2sql_bench::eval::ExecutionEvaluator;
use nl2sql_bench::{BenchError, Result};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::common::{options, SpiderFixture};

fn benchmark_with<G>(fixture: &SpiderFixture, generator: G, options: RunConfig) -> Benchmark
where
    G: nl2sql_bench::pipeline::SqlGenerator + 'static,
{
    Benchmark::builder(fixture.loader())
        .generator(generator)
        .progress(Arc::new(SilentProgress))
        .options(options)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_exact_match_ignores_casing_and_spacing() {
    let fixture = SpiderFixture::new(&[(
        "How many singers do we have?",
        "concert_singer",
        "SELECT count(*) FROM singer",
    )]);
    let mut benchmark = benchmark_with(
        &fixture,
        |_: &str, _: &str| -> Result<String> { Ok("select   COUNT( * )\nfrom SINGER ;".to_string()) },
        options(1),
    );

    let outcome = benchmark.run().await.unwrap();
    let report = outcome.report;

    assert_eq!(report.total_samples(), 1);
    assert!(report.results()[0].exact_match);
    assert!(report.results()[0].is_valid_sql);
    assert_eq!(report.exact_match_accuracy(), 1.0);
    assert_eq!(report.valid_sql_rate(), 1.0);
}

#[tokio::test]
async fn test_generator_failure_does_not_stop_the_run() {
    let fixture = SpiderFixture::new(&[
        ("How many singers do we have?", "concert_singer", "SELECT count(*) FROM singer"),
        ("What is the capacity of every stadium?", "concert_singer", "SELECT capacity FROM stadium"),
        ("List all singer names.", "concert_singer", "SELECT name FROM singer"),
    ]);
    let mut benchmark = benchmark_with(
        &fixture,
        |question: &str, _: &str| -> Result<String> {
            if question.contains("stadium") {
                Err(BenchError::llm("upstream returned 503"))
            } else if question.contains("How many") {
                Ok("SELECT count(*) FROM singer".to_string())
            } else {
                Ok("SELECT name FROM singer".to_string())
            }
        },
        options(3),
    );

    let outcome = benchmark.run().await.unwrap();
    let report = outcome.report;
    let failed = &report.results()[1];

    assert_eq!(report.total_samples(), 3);
    assert_eq!(report.error_count(), 1);
    assert_eq!(failed.error.as_deref(), Some("LLM error: upstream returned 503"));
    assert_eq!(failed.predicted_sql, "");
    assert!(!failed.exact_match);
    assert!(!failed.is_valid_sql);
    assert!(report.results()[2].exact_match);
    assert_eq!(report.exact_match_count(), 2);
}

#[tokio::test]
async fn test_over_request_returns_whole_dataset() {
    let fixture = SpiderFixture::with_count_questions(3);
    let mut benchmark = benchmark_with(
        &fixture,
        |_: &str, _: &str| -> Result<String> { Ok("SELECT 1".to_string()) },
        RunConfig {
            samples: 50,
            shuffle: true,
            save_results: false,
            ..RunConfig::default()
        },
    );

    let outcome = benchmark.run().await.unwrap();
    let questions: BTreeSet<&str> = outcome
        .report
        .results()
        .iter()
        .map(|r| r.question.as_str())
        .collect();

    assert_eq!(outcome.report.total_samples(), 3);
    assert_eq!(
        questions,
        BTreeSet::from(["Question number 0", "Question number 1", "Question number 2"])
    );
}

#[tokio::test]
async fn test_same_seed_reproduces_sample_order() {
    let fixture = SpiderFixture::with_count_questions(20);
    let run_options = RunConfig {
        samples: 5,
        shuffle: true,
        seed: 1234,
        save_results: false,
        ..RunConfig::default()
    };

    let mut order = Vec::new();
    for _ in 0..2 {
        let mut benchmark = benchmark_with(
            &fixture,
            |_: &str, _: &str| -> Result<String> { Ok("SELECT 1".to_string()) },
            run_options.clone(),
        );
        let outcome = benchmark.run().await.unwrap();
        let questions: Vec<String> = outcome
            .report
            .results()
            .iter()
            .map(|r| r.question.clone())
            .collect();
        order.push(questions);
    }

    assert_eq!(order[0].len(), 5);
    assert_eq!(order[0], order[1]);
}

#[tokio::test]
async fn test_execution_accuracy_end_to_end() {
    let fixture = SpiderFixture::new(&[
        // Same rows in a different order: execution match, not exact match.
        ("Singer names by age ascending", "concert_singer", "SELECT name FROM singer ORDER BY age ASC"),
        // Different rows: executed, mismatched.
        ("Singers from France", "concert_singer", "SELECT name FROM singer WHERE country = 'France'"),
        // Gold cannot run: excluded from the execution denominator.
        ("Broken gold query", "concert_singer", "SELECT name FROM concerts"),
        // No database for this id: also excluded.
        ("Pets per student", "pets_1", "SELECT count(*) FROM Has_Pet"),
    ]);
    fixture.create_concert_singer().await;

    let generator = |question: &str, _: &str| -> Result<String> {
        let sql = match question {
            "Singer names by age ascending" => "SELECT name FROM singer ORDER BY age DESC",
            "Singers from France" => "SELECT name FROM singer WHERE country = 'Netherlands'",
            _ => "SELECT 1",
        };
        Ok(sql.to_string())
    };

    let mut benchmark = Benchmark::builder(fixture.loader())
        .generator(generator)
        .execution(ExecutionEvaluator::new(fixture.databases_dir()))
        .progress(Arc::new(SilentProgress))
        .options(options(4))
        .build()
        .unwrap();
    assert!(benchmark.flags().execution_eval_enabled);

    let outcome = benchmark.run().await.unwrap();
    let report = outcome.report;
    let matches: Vec<Option<bool>> = report.results().iter().map(|r| r.execution_match).collect();

    assert_eq!(matches, vec![Some(true), Some(false), None, None]);
    assert!(!report.results()[0].exact_match);
    assert_eq!(report.executed_count(), 2);
    assert_eq!(report.execution_accuracy(), 0.5);
    assert_eq!(report.summary().execution_accuracy, 50.0);
}

#[tokio::test]
async fn test_run_writes_artifact() {
    let fixture = SpiderFixture::new(&[
        ("How many singers do we have?", "concert_singer", "SELECT count(*) FROM singer"),
        ("List all singer names.", "concert_singer", "SELECT name FROM singer"),
    ]);
    let output = tempdir().unwrap();
    let output_dir = output.path().join("benchmarks").join("results");

    let mut benchmark = benchmark_with(
        &fixture,
        |_: &str, _: &str| -> Result<String> { Ok("SELECT count(*) FROM singer".to_string()) },
        RunConfig {
            save_results: true,
            output_dir: output_dir.clone(),
            ..options(2)
        },
    );

    let outcome = benchmark.run().await.unwrap();
    let path = outcome.artifact.expect("artifact should be written");
    assert!(path.starts_with(&output_dir));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["summary"]["total_samples"], 2);
    assert_eq!(doc["summary"]["exact_match_accuracy"], 50.0);
    assert_eq!(doc["config"]["llm_judge_enabled"], false);
    assert_eq!(doc["config"]["execution_eval_enabled"], false);
    assert_eq!(doc["details"].as_array().unwrap().len(), 2);
    assert_eq!(doc["details"][1]["gold_sql"], "SELECT name FROM singer");
    assert!(doc["timestamp"].as_str().unwrap().len() == "YYYYMMDD_HHMMSS".len());
}

#[tokio::test]
async fn test_zero_samples_produces_empty_report() {
    let fixture = SpiderFixture::with_count_questions(3);
    let mut benchmark = benchmark_with(
        &fixture,
        |_: &str, _: &str| -> Result<String> { Ok("SELECT 1".to_string()) },
        options(0),
    );

    let outcome = benchmark.run().await.unwrap();
    assert_eq!(outcome.report.total_samples(), 0);
    assert_eq!(outcome.report.exact_match_accuracy(), 0.0);
    assert_eq!(outcome.report.avg_latency_ms(), 0.0);
}
