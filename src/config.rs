//! Configuration management for the benchmark harness.
//!
//! Handles loading configuration from TOML files, with sections for the
//! dataset location, run parameters, the optional evaluators and the LLM
//! provider. API keys are read from the environment only.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Location of the Spider-style dataset documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding the examples and tables documents.
    #[serde(default = "default_spider_dir")]
    pub spider_dir: PathBuf,

    /// Examples document file name (e.g., "dev.json", "train_spider.json").
    #[serde(default = "default_examples_file")]
    pub examples_file: String,

    /// Table-metadata document file name.
    #[serde(default = "default_tables_file")]
    pub tables_file: String,
}

fn default_spider_dir() -> PathBuf {
    PathBuf::from("data/spider")
}

fn default_examples_file() -> String {
    "dev.json".to_string()
}

fn default_tables_file() -> String {
    "tables.json".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            spider_dir: default_spider_dir(),
            examples_file: default_examples_file(),
            tables_file: default_tables_file(),
        }
    }
}

impl DatasetConfig {
    pub fn examples_path(&self) -> PathBuf {
        self.spider_dir.join(&self.examples_file)
    }

    pub fn tables_path(&self) -> PathBuf {
        self.spider_dir.join(&self.tables_file)
    }
}

/// Parameters of a single benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of examples to evaluate (clamped to the dataset size).
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Draw a seeded random subset instead of the first `samples` examples.
    #[serde(default = "default_true")]
    pub shuffle: bool,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Emit a progress summary every this many processed examples.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Write the results artifact at the end of the run.
    #[serde(default = "default_true")]
    pub save_results: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_samples() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    42
}

fn default_progress_interval() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("benchmarks/results")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            shuffle: true,
            seed: default_seed(),
            progress_interval: default_progress_interval(),
            save_results: true,
            output_dir: default_output_dir(),
        }
    }
}

/// Execution-accuracy evaluator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Root directory with one `<db_id>/` folder per database.
    pub databases_dir: Option<PathBuf>,

    /// Per-query timeout in seconds.
    #[serde(default = "default_execution_timeout")]
    pub timeout_secs: u64,

    /// Database file extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_execution_timeout() -> u64 {
    30
}

fn default_extension() -> String {
    "sqlite".to_string()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            databases_dir: None,
            timeout_secs: default_execution_timeout(),
            extension: default_extension(),
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Semantic judge settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai", "huggingface" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "Qwen/Qwen2.5-Coder-32B-Instruct").
    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the provider's chat-completions endpoint.
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "huggingface".to_string()
}

fn default_model() -> String {
    "Qwen/Qwen2.5-Coder-32B-Instruct".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nl2sql-bench")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| BenchError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            BenchError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.execution.enabled && self.execution.databases_dir.is_none() {
            return Err(BenchError::config(
                "execution.enabled requires execution.databases_dir",
            ));
        }
        if self.run.progress_interval == 0 {
            return Err(BenchError::config("run.progress_interval must be at least 1"));
        }
        Ok(())
    }
}
