//! Execution evaluation against real SQLite files.

use std::time::{Duration, Instant};

use nl2sql_bench::db::{Row, Value};
use nl2sql_bench::eval::{ExecutionEvaluator, ExecutionVerdict, QueryOutcome};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::Connection;

use super::common::{SpiderFixture, CONCERT_SINGER_SQL};

fn single_column(values: &[&str]) -> Vec<Row> {
    values.iter().map(|v| vec![Value::from(*v)]).collect()
}

#[test]
fn test_row_order_does_not_matter() {
    let gold = single_column(&["a", "b"]);
    let predicted = single_column(&["b", "a"]);
    assert!(ExecutionEvaluator::results_match(&gold, &predicted));
}

#[test]
fn test_column_order_matters() {
    let left = vec![vec![Value::from("a"), Value::from(1)]];
    let right = vec![vec![Value::from(1), Value::from("a")]];
    assert_ne!(
        ExecutionEvaluator::normalize_results(&left),
        ExecutionEvaluator::normalize_results(&right)
    );
}

#[tokio::test]
async fn test_evaluate_matching_and_differing_queries() {
    let fixture = SpiderFixture::with_count_questions(1);
    fixture.create_concert_singer().await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let verdict = evaluator
        .evaluate(
            "SELECT name FROM singer WHERE age > 40",
            "SELECT Name FROM singer WHERE Age >= 41 ORDER BY Name",
            "concert_singer",
        )
        .await;
    assert_eq!(verdict.matched(), Some(true));
    assert_eq!(verdict.message(), "Results match");

    let verdict = evaluator
        .evaluate(
            "SELECT name FROM singer",
            "SELECT name FROM singer WHERE country = 'France'",
            "concert_singer",
        )
        .await;
    assert_eq!(verdict.matched(), Some(false));
    assert_eq!(
        verdict.message(),
        "Results differ (gold: 4 rows, predicted: 2 rows)"
    );
}

#[tokio::test]
async fn test_predicted_failure_counts_as_mismatch() {
    let fixture = SpiderFixture::with_count_questions(1);
    fixture.create_concert_singer().await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let verdict = evaluator
        .evaluate("SELECT name FROM singer", "SELECT nme FROM singer", "concert_singer")
        .await;

    assert!(matches!(verdict, ExecutionVerdict::PredictedFailed { .. }));
    assert_eq!(verdict.matched(), Some(false));
    assert!(verdict.message().starts_with("Predicted query failed: SQL Error:"));
}

#[tokio::test]
async fn test_gold_failure_is_not_a_mismatch() {
    let fixture = SpiderFixture::with_count_questions(1);
    fixture.create_concert_singer().await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let verdict = evaluator
        .evaluate("SELECT * FROM concert", "SELECT 1", "concert_singer")
        .await;

    assert!(!verdict.could_execute());
    assert_eq!(verdict.matched(), None);
    assert!(verdict.message().starts_with("Gold query failed:"));
}

#[tokio::test]
async fn test_missing_database() {
    let fixture = SpiderFixture::with_count_questions(1);
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let outcome = evaluator.execute("SELECT 1", "concert_singer").await;
    assert_eq!(
        outcome,
        QueryOutcome::Failed("Database not found: concert_singer".to_string())
    );

    let verdict = evaluator.evaluate("SELECT 1", "SELECT 1", "concert_singer").await;
    assert_eq!(verdict.matched(), None);
}

#[tokio::test]
async fn test_fallback_database_file_name() {
    let fixture = SpiderFixture::with_count_questions(1);
    let path = fixture
        .create_database("concert_singer", "database", CONCERT_SINGER_SQL)
        .await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    assert_eq!(evaluator.database_path("concert_singer"), Some(path));

    let outcome = evaluator
        .execute("SELECT count(*) FROM stadium", "concert_singer")
        .await;
    assert_eq!(outcome.rows(), Some(&[vec![Value::Int(2)]][..]));
}

#[tokio::test]
async fn test_mutating_prediction_cannot_change_the_database() {
    let fixture = SpiderFixture::with_count_questions(1);
    fixture.create_concert_singer().await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let verdict = evaluator
        .evaluate(
            "SELECT count(*) FROM singer",
            "DELETE FROM singer",
            "concert_singer",
        )
        .await;
    assert_eq!(verdict.matched(), Some(false));

    let outcome = evaluator
        .execute("SELECT count(*) FROM singer", "concert_singer")
        .await;
    assert_eq!(outcome.rows(), Some(&[vec![Value::Int(4)]][..]));
}

#[tokio::test]
async fn test_locked_database_fails_after_busy_timeout() {
    let fixture = SpiderFixture::with_count_questions(1);
    let path = fixture.create_concert_singer().await;

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .journal_mode(SqliteJournalMode::Delete);
    let mut holder = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::raw_sql("BEGIN EXCLUSIVE")
        .execute(&mut holder)
        .await
        .unwrap();

    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());
    let started = Instant::now();
    let outcome = evaluator
        .execute_with_timeout(
            "SELECT count(*) FROM singer",
            "concert_singer",
            Duration::from_secs(1),
        )
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(outcome, QueryOutcome::Failed(_)), "{outcome:?}");
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");

    sqlx::raw_sql("ROLLBACK").execute(&mut holder).await.unwrap();
    holder.close().await.unwrap();

    let outcome = evaluator
        .execute("SELECT count(*) FROM singer", "concert_singer")
        .await;
    assert_eq!(outcome.rows(), Some(&[vec![Value::Int(4)]][..]));
}

#[tokio::test]
async fn test_multiple_statements_fail_to_execute() {
    let fixture = SpiderFixture::with_count_questions(1);
    fixture.create_concert_singer().await;
    let evaluator = ExecutionEvaluator::new(fixture.databases_dir());

    let outcome = evaluator.execute("SELECT 1; SELECT 2", "concert_singer").await;
    assert!(matches!(outcome, QueryOutcome::Failed(_)), "{outcome:?}");

    let verdict = evaluator
        .evaluate(
            "SELECT 1 UNION ALL SELECT 2",
            "SELECT 1; SELECT 2",
            "concert_singer",
        )
        .await;
    assert!(matches!(verdict, ExecutionVerdict::PredictedFailed { .. }));
    assert_eq!(verdict.matched(), Some(false));
}
