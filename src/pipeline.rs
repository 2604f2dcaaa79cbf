//! The system under test: anything that turns a question into SQL.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::llm::{extract_sql, prompt, LlmClient};

/// Candidate NL-to-SQL generator.
///
/// Failures are captured per example by the benchmark and never abort a run.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, question: &str, schema: &str) -> Result<String>;
}

/// Plain functions and closures are generators too.
#[async_trait]
impl<F> SqlGenerator for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    async fn generate(&self, question: &str, schema: &str) -> Result<String> {
        self(question, schema)
    }
}

/// Baseline generator that prompts a chat model once per question.
pub struct LlmSqlGenerator {
    client: Arc<dyn LlmClient>,
}

impl LlmSqlGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SqlGenerator for LlmSqlGenerator {
    async fn generate(&self, question: &str, schema: &str) -> Result<String> {
        let messages = prompt::build_generation_messages(question, schema);
        let response = self.client.complete(&messages).await?;
        let sql = extract_sql(&response);
        debug!(sql = %sql, "generated SQL");
        Ok(sql)
    }
}
