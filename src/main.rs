//! nl2sql-bench command-line entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use nl2sql_bench::benchmark::{Benchmark, TracingProgress};
use nl2sql_bench::cli::{Cli, Command, RunArgs, SchemaArgs};
use nl2sql_bench::config::Config;
use nl2sql_bench::dataset::DataLoader;
use nl2sql_bench::eval::{ExecutionEvaluator, LlmJudge};
use nl2sql_bench::llm::create_client;
use nl2sql_bench::logging;
use nl2sql_bench::pipeline::LlmSqlGenerator;

#[tokio::main]
async fn main() {
    // A missing .env is fine; keys may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose, cli.log_file.as_deref());

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    match &cli.command {
        Command::Run(args) => run_benchmark(&mut config, args).await,
        Command::Schema(args) => print_schema(&mut config, args),
    }
}

async fn run_benchmark(config: &mut Config, args: &RunArgs) -> Result<()> {
    args.apply(config);
    config.validate()?;

    let client = create_client(&config.llm, None).context("failed to create LLM client")?;
    info!(
        "Generator: {} ({})",
        config.llm.model, config.llm.provider
    );

    let mut builder = Benchmark::builder(DataLoader::new(&config.dataset))
        .generator(LlmSqlGenerator::new(client.clone()))
        .progress(Arc::new(TracingProgress))
        .options(config.run.clone());

    if config.execution.enabled {
        builder = builder.execution(ExecutionEvaluator::from_config(&config.execution)?);
    }
    if config.judge.enabled {
        builder = builder.judge(Arc::new(LlmJudge::new(client)));
    }

    let mut benchmark = builder.build()?;
    let outcome = benchmark.run().await?;

    let summary = serde_json::to_string_pretty(&outcome.report.summary())?;
    println!("{summary}");
    if let Some(path) = outcome.artifact {
        println!("Results saved to: {}", path.display());
    }

    Ok(())
}

fn print_schema(config: &mut Config, args: &SchemaArgs) -> Result<()> {
    args.apply(config);

    let mut loader = DataLoader::new(&config.dataset);
    loader.load()?;

    let info = loader
        .get_table_info(&args.db_id)
        .with_context(|| format!("unknown database '{}'", args.db_id))?;
    info!(
        "{}: {} tables, {} columns",
        info.db_id,
        info.table_names.len(),
        info.column_names.len().saturating_sub(1)
    );
    println!("{}", loader.get_schema(&args.db_id));

    Ok(())
}
