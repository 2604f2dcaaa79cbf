//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{BenchError, Result};
use crate::llm::openai::{HUGGINGFACE_API_URL, OPENAI_API_URL};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates an LLM client from the `[llm]` config section.
///
/// If `api_key` is provided, it takes precedence over the provider's
/// environment variable (`OPENAI_API_KEY` or `HF_API_TOKEN`). API keys are
/// never read from the config file.
pub fn create_client(config: &LlmConfig, api_key: Option<String>) -> Result<Arc<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(BenchError::config)?;

    let api_url = match provider {
        LlmProvider::Mock => return Ok(Arc::new(MockLlmClient::new())),
        LlmProvider::OpenAi => OPENAI_API_URL,
        LlmProvider::HuggingFace => HUGGINGFACE_API_URL,
    };

    let key = api_key
        .or_else(|| provider.api_key_env().and_then(|var| std::env::var(var).ok()))
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            BenchError::llm(format!(
                "No API key configured. Set {}.",
                provider.api_key_env().unwrap_or("an API key")
            ))
        })?;

    let client_config = OpenAiConfig::new(key, &config.model)
        .with_api_url(config.base_url.as_deref().unwrap_or(api_url))
        .with_sampling(config.temperature, config.max_tokens)
        .with_timeout(config.timeout_secs);

    Ok(Arc::new(OpenAiClient::new(client_config)?))
}
