//! Error types for the benchmark harness.
//!
//! Defines the main error enum used throughout the crate. Per-example failures
//! are folded into result records and never reach this type's callers; what
//! remains here is what aborts a run.

use thiserror::Error;

/// Main error type for benchmark operations.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Dataset input errors (missing examples file, malformed table metadata, etc.)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration errors (invalid config file, no SQL generator registered, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query execution errors (syntax errors, missing tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Semantic judge errors (unparseable verdicts, etc.)
    #[error("Judge error: {0}")]
    Judge(String),

    /// Result artifact errors (unwritable output directory, etc.)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchError {
    /// Creates a dataset error with the given message.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a judge error with the given message.
    pub fn judge(msg: impl Into<String>) -> Self {
        Self::Judge(msg.into())
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "Dataset Error",
            Self::Config(_) => "Configuration Error",
            Self::Query(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Judge(_) => "Judge Error",
            Self::Persistence(_) => "Persistence Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using BenchError.
pub type Result<T> = std::result::Result<T, BenchError>;
