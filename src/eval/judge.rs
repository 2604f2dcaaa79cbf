//! Semantic-equivalence judging.
//!
//! The harness only depends on the [`Judge`] contract. [`LlmJudge`] is the
//! stock implementation that asks a chat model for a JSON verdict.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::llm::{extract_json, prompt, LlmClient};

/// Verdict returned by a judge for one (gold, predicted) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub is_equivalent: bool,
    /// 0 (unrelated) to [`JudgeVerdict::MAX_SCORE`] (equivalent).
    pub score: u8,
    pub reasoning: String,
}

impl JudgeVerdict {
    pub const MAX_SCORE: u8 = 5;

    /// Creates a verdict, clamping `score` into range.
    pub fn new(is_equivalent: bool, score: u8, reasoning: impl Into<String>) -> Self {
        Self {
            is_equivalent,
            score: score.min(Self::MAX_SCORE),
            reasoning: reasoning.into(),
        }
    }

    /// Verdict for a prediction that already matched the gold query exactly.
    pub fn exact_match() -> Self {
        Self::new(true, Self::MAX_SCORE, "Exact match")
    }
}

/// Semantic equivalence oracle.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(
        &self,
        question: &str,
        gold_sql: &str,
        predicted_sql: &str,
    ) -> Result<JudgeVerdict>;
}

/// Judge backed by a chat model.
pub struct LlmJudge {
    client: Arc<dyn LlmClient>,
}

impl LlmJudge {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Parses a model response into a verdict.
    ///
    /// Accepts bare JSON, fenced JSON or JSON embedded in prose. Scores
    /// outside 0..=5 are clamped.
    pub fn parse_verdict(response: &str) -> Result<JudgeVerdict> {
        let raw: RawVerdict = serde_json::from_str(extract_json(response)).map_err(|e| {
            BenchError::judge(format!("Failed to parse verdict: {}", e))
        })?;

        let score = raw.score.round().clamp(0.0, f64::from(JudgeVerdict::MAX_SCORE)) as u8;

        Ok(JudgeVerdict::new(raw.is_equivalent, score, raw.reasoning))
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn judge(
        &self,
        question: &str,
        gold_sql: &str,
        predicted_sql: &str,
    ) -> Result<JudgeVerdict> {
        let messages = prompt::build_judge_messages(question, gold_sql, predicted_sql);
        let response = self
            .client
            .complete(&messages)
            .await
            .map_err(|e| BenchError::judge(e.to_string()))?;

        Self::parse_verdict(&response)
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_equivalent: bool,
    score: f64,
    #[serde(default)]
    reasoning: String,
}
