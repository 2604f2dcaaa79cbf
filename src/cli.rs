//! Command-line argument parsing for nl2sql-bench.
//!
//! Flags override the matching config-file values.

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Benchmark harness for natural-language-to-SQL generators.
#[derive(Parser, Debug)]
#[command(name = "nl2sql-bench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the benchmark against the configured LLM generator
    Run(RunArgs),

    /// Print the synthesized schema for one database
    Schema(SchemaArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Spider dataset directory
    #[arg(long, value_name = "DIR")]
    pub spider_dir: Option<PathBuf>,

    /// Examples file inside the dataset directory (e.g., train_spider.json)
    #[arg(long, value_name = "FILE")]
    pub examples_file: Option<String>,

    /// Number of examples to evaluate
    #[arg(short = 'n', long, value_name = "N")]
    pub samples: Option<usize>,

    /// Sampling seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Take the first N examples instead of a random subset
    #[arg(long)]
    pub no_shuffle: bool,

    /// Enable execution evaluation against the databases in DIR
    #[arg(long, value_name = "DIR")]
    pub databases_dir: Option<PathBuf>,

    /// Enable the LLM judge
    #[arg(long)]
    pub judge: bool,

    /// Directory for the results artifact
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not write a results artifact
    #[arg(long)]
    pub no_save: bool,

    /// LLM provider (openai, huggingface, mock)
    #[arg(long, env = "NL2SQL_PROVIDER")]
    pub provider: Option<String>,

    /// Model name
    #[arg(long, env = "NL2SQL_MODEL")]
    pub model: Option<String>,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Database id (e.g., concert_singer)
    pub db_id: String,

    /// Spider dataset directory
    #[arg(long, value_name = "DIR")]
    pub spider_dir: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

impl RunArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.spider_dir {
            config.dataset.spider_dir = dir.clone();
        }
        if let Some(file) = &self.examples_file {
            config.dataset.examples_file = file.clone();
        }
        if let Some(samples) = self.samples {
            config.run.samples = samples;
        }
        if let Some(seed) = self.seed {
            config.run.seed = seed;
        }
        if self.no_shuffle {
            config.run.shuffle = false;
        }
        if let Some(dir) = &self.databases_dir {
            config.execution.enabled = true;
            config.execution.databases_dir = Some(dir.clone());
        }
        if self.judge {
            config.judge.enabled = true;
        }
        if let Some(dir) = &self.output_dir {
            config.run.output_dir = dir.clone();
        }
        if self.no_save {
            config.run.save_results = false;
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
    }
}

impl SchemaArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.spider_dir {
            config.dataset.spider_dir = dir.clone();
        }
    }
}
