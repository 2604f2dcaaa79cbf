//! Prompt construction for LLM requests.
//!
//! Builds the messages for SQL generation and for the semantic judge.

use crate::llm::types::Message;

/// System prompt for the SQL generator.
const GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert SQL developer working against SQLite databases.

INSTRUCTIONS:
- Generate ONLY the SQL query, without any explanation
- The query must be syntactically correct SQLite
- Use only tables and columns that appear in the schema
- Do not add LIMIT clauses unless the question asks for them

OUTPUT FORMAT:
Return the SQL query wrapped in ```sql code blocks."#;

/// System prompt for the semantic judge.
const JUDGE_SYSTEM_PROMPT: &str = r#"You are an expert SQL reviewer. You decide whether two SQL queries are semantically equivalent: whether they return the same answer to the question on any database with the given schema.

Ignore differences in formatting, aliasing, column order in joins, and equivalent constructs (e.g. JOIN vs subquery) when they do not change the result.

Respond ONLY with a JSON object of the form:
{"is_equivalent": true, "score": 5, "reasoning": "one or two sentences"}

The score ranges from 0 (unrelated) to 5 (equivalent)."#;

/// Builds the message list asking the model to translate `question` to SQL.
pub fn build_generation_messages(question: &str, schema: &str) -> Vec<Message> {
    let user = format!("Database Schema:\n{schema}\n\nQuestion: {question}");

    vec![Message::system(GENERATION_SYSTEM_PROMPT), Message::user(user)]
}

/// Builds the message list asking the model to compare two queries.
pub fn build_judge_messages(question: &str, gold_sql: &str, predicted_sql: &str) -> Vec<Message> {
    let user = format!(
        r#"Question: {question}

Gold SQL:
{gold_sql}

Predicted SQL:
{predicted_sql}

Are these queries semantically equivalent?"#
    );

    vec![Message::system(JUDGE_SYSTEM_PROMPT), Message::user(user)]
}
