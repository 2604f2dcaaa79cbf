//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{BenchError, Result};
use crate::llm::types::{last_user_content, Message};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Patterns are matched case-insensitively against the last user message, in
/// registration order. Used for unit testing without making real API calls.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Patterns that make the client fail instead of answering.
    error_patterns: Vec<String>,
    /// Response when nothing matches.
    fallback: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes the client return an LLM error when the input contains `pattern`.
    pub fn with_error(mut self, pattern: impl Into<String>) -> Self {
        self.error_patterns.push(pattern.into());
        self
    }

    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Number of completions requested so far, across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn mock_response(&self, input: &str) -> Result<String> {
        let input_lower = input.to_lowercase();

        for pattern in &self.error_patterns {
            if input_lower.contains(&pattern.to_lowercase()) {
                return Err(BenchError::llm(format!(
                    "mock failure for pattern '{}'",
                    pattern
                )));
            }
        }

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        Ok(self
            .fallback
            .clone()
            .unwrap_or_else(|| "```sql\nSELECT 1\n```".to_string()))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mock_response(last_user_content(messages))
    }
}
