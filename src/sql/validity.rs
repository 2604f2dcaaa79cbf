//! SQL validity checks.
//!
//! Uses sqlparser-rs with the SQLite dialect to decide whether a predicted
//! statement parses and is of a recognized statement type.

use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{BenchError, Result};

use super::StatementType;

/// Parses SQL and reports the leading statement's type.
#[derive(Debug)]
pub struct SqlValidator {
    dialect: SQLiteDialect,
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Returns the type of the first statement in `sql`.
    ///
    /// Fails if the SQL does not parse; empty input yields `Unknown`.
    pub fn statement_type(&self, sql: &str) -> Result<StatementType> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| BenchError::query(format!("SQL parse error: {}", e)))?;

        Ok(statements
            .first()
            .map(classify_statement)
            .unwrap_or(StatementType::Unknown))
    }

    /// Returns true if `sql` parses and is not of an unrecognized type.
    pub fn is_valid(&self, sql: &str) -> bool {
        matches!(self.statement_type(sql), Ok(t) if t != StatementType::Unknown)
    }
}

/// Convenience function to check SQL without creating a validator instance.
pub fn is_valid_sql(sql: &str) -> bool {
    SqlValidator::new().is_valid(sql)
}

/// Counts the non-empty statements in `sql`.
///
/// Works on tokens rather than a full parse, so SQL the parser rejects is
/// still counted. Semicolons inside literals and comments are not separators.
/// Input that does not tokenize counts as one statement.
pub fn statement_count(sql: &str) -> usize {
    let Ok(tokens) = Tokenizer::new(&SQLiteDialect {}, sql).tokenize() else {
        return 1;
    };

    let mut count = 0;
    let mut in_statement = false;
    for token in &tokens {
        match token {
            Token::SemiColon => in_statement = false,
            Token::Whitespace(_) | Token::EOF => {}
            _ if !in_statement => {
                in_statement = true;
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Maps a parsed statement to its type.
fn classify_statement(statement: &Statement) -> StatementType {
    match statement {
        Statement::Query(query) => {
            if query.with.is_some() {
                StatementType::With
            } else {
                StatementType::Select
            }
        }
        Statement::Explain { .. } => StatementType::Explain,
        Statement::Pragma { .. } => StatementType::Pragma,

        Statement::Insert(_) => StatementType::Insert,
        Statement::Update { .. } => StatementType::Update,
        Statement::Delete(_) => StatementType::Delete,

        Statement::Drop { .. } => StatementType::Drop,
        Statement::AlterTable { .. } => StatementType::Alter,
        Statement::AlterIndex { .. } => StatementType::Alter,
        Statement::AlterView { .. } => StatementType::Alter,
        Statement::CreateTable { .. } => StatementType::Create,
        Statement::CreateIndex { .. } => StatementType::Create,
        Statement::CreateView { .. } => StatementType::Create,

        _ => StatementType::Unknown,
    }
}
