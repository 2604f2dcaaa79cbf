//! Optional evaluators: execution accuracy and semantic judging.

pub mod execution;
pub mod judge;

pub use execution::{ExecutionEvaluator, ExecutionVerdict, QueryOutcome};
pub use judge::{Judge, JudgeVerdict, LlmJudge};
