//! Runs with the LLM-backed generator and judge over a mock client.

use std::sync::Arc;

use nl2sql_bench::benchmark::{Benchmark, SilentProgress};
use nl2sql_bench::config::LlmConfig;
use nl2sql_bench::eval::LlmJudge;
use nl2sql_bench::llm::{create_client, LlmClient, Message, MockLlmClient};
use nl2sql_bench::pipeline::LlmSqlGenerator;

use super::common::{options, SpiderFixture};

#[tokio::test]
async fn test_llm_generator_and_judge() {
    let fixture = SpiderFixture::new(&[
        ("How many singers do we have?", "concert_singer", "SELECT count(*) FROM singer"),
        ("What is the average singer age?", "concert_singer", "SELECT avg(age) FROM singer"),
        ("Which stadium is the largest?", "concert_singer", "SELECT name FROM stadium ORDER BY capacity DESC LIMIT 1"),
    ]);

    // Generation prompts end with the question; judge prompts contain "Predicted SQL".
    let generator_client = MockLlmClient::new()
        .with_response("how many singers", "```sql\nSELECT COUNT(*) FROM singer;\n```")
        .with_response("average singer age", "```sql\nSELECT sum(age) / count(*) FROM singer\n```")
        .with_response("largest", "Sorry, I cannot help with that.");
    let judge_client = MockLlmClient::new().with_response(
        "sum(age)",
        r#"```json
{"is_equivalent": true, "score": 4, "reasoning": "sum over count is the average"}
```"#,
    );

    let mut benchmark = Benchmark::builder(fixture.loader())
        .generator(LlmSqlGenerator::new(Arc::new(generator_client.clone())))
        .judge(Arc::new(LlmJudge::new(Arc::new(judge_client.clone()))))
        .progress(Arc::new(SilentProgress))
        .options(options(3))
        .build()
        .unwrap();

    let outcome = benchmark.run().await.unwrap();
    let results = outcome.report.results();

    // Exact match: judged equivalent without a judge call.
    assert!(results[0].exact_match);
    assert_eq!(results[0].llm_judge_score, 5);

    // Judged by the model.
    assert!(!results[1].exact_match);
    assert_eq!(results[1].llm_judge_match, Some(true));
    assert_eq!(results[1].llm_judge_score, 4);
    assert_eq!(results[1].llm_judge_reasoning, "sum over count is the average");

    // Prose instead of SQL: invalid, left unjudged without a call.
    assert!(!results[2].is_valid_sql);
    assert_eq!(results[2].llm_judge_match, None);
    assert_eq!(results[2].llm_judge_score, 0);

    assert_eq!(generator_client.call_count(), 3);
    assert_eq!(judge_client.call_count(), 1);
    assert_eq!(outcome.report.judged_count(), 2);
    assert_eq!(outcome.report.llm_judge_accuracy(), 1.0);
    assert!((outcome.report.llm_judge_avg_score() - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_factory_builds_mock_client() {
    let config = LlmConfig {
        provider: "mock".to_string(),
        ..LlmConfig::default()
    };
    let client = create_client(&config, None).unwrap();
    let response = client
        .complete(&[Message::user("anything")])
        .await
        .unwrap();
    assert!(response.contains("SELECT"));
}
