//! nl2sql-bench: a benchmark harness for natural-language-to-SQL generators.
//!
//! Loads a Spider-style dataset, runs a [`pipeline::SqlGenerator`] over a
//! deterministic sample and scores each prediction by exact match, and
//! optionally by execution accuracy and a semantic judge.

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod eval;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sql;

pub use benchmark::{Benchmark, BenchmarkBuilder, RunOutcome, RunPhase};
pub use error::{BenchError, Result};
