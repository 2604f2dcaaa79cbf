//! SQL canonicalization for syntactic comparison.
//!
//! Lower-cases the statement, strips comments and the trailing terminator,
//! unifies quotes and fixes spacing around operators, commas and parentheses.
//! Operator characters inside quoted literals are spaced like any other; both
//! sides of a comparison go through the same rules, so the effect is symmetric.

use regex::Regex;
use std::sync::OnceLock;

/// Canonicalizes SQL text.
#[derive(Debug)]
pub struct SqlNormalizer {
    line_comment: Regex,
    block_comment: Regex,
    whitespace: Regex,
    operator: Regex,
    comma: Regex,
    open_paren: Regex,
    close_paren: Regex,
}

impl Default for SqlNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlNormalizer {
    /// Creates a normalizer with its patterns compiled.
    pub fn new() -> Self {
        Self {
            line_comment: compile(r"(?m)--.*$"),
            block_comment: compile(r"(?s)/\*.*?\*/"),
            whitespace: compile(r"\s+"),
            operator: compile(r"\s*([=<>!]+)\s*"),
            comma: compile(r"\s*,\s*"),
            open_paren: compile(r"\s*\(\s*"),
            close_paren: compile(r"\s*\)\s*"),
        }
    }

    /// Returns the canonical form of `sql`. Idempotent.
    pub fn normalize(&self, sql: &str) -> String {
        if sql.is_empty() {
            return String::new();
        }

        let sql = self.strip_comments(&sql.to_lowercase());
        let sql = self.whitespace.replace_all(&sql, " ");
        let sql = strip_terminators(&sql).replace('"', "'");

        let sql = self.operator.replace_all(&sql, " ${1} ");
        let sql = self.comma.replace_all(&sql, ", ");
        let sql = self.open_paren.replace_all(&sql, " (");
        let sql = self.close_paren.replace_all(&sql, ") ");

        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Returns true if both statements share a canonical form.
    pub fn exact_match(&self, gold: &str, predicted: &str) -> bool {
        self.normalize(gold) == self.normalize(predicted)
    }

    /// Removes comments until none remain; removing a block comment can
    /// splice two dashes into a new line comment.
    fn strip_comments(&self, sql: &str) -> String {
        let mut current = sql.to_string();
        loop {
            let without_line = self.line_comment.replace_all(&current, "");
            let stripped = self.block_comment.replace_all(&without_line, "").into_owned();
            if stripped == current {
                return stripped;
            }
            current = stripped;
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalizer patterns are valid")
}

/// Drops trailing `;` runs, including ones separated by whitespace.
fn strip_terminators(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
        .trim()
}

fn shared() -> &'static SqlNormalizer {
    static NORMALIZER: OnceLock<SqlNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(SqlNormalizer::new)
}

/// Canonicalizes `sql` with the shared normalizer.
pub fn normalize(sql: &str) -> String {
    shared().normalize(sql)
}

/// Syntactic exact match after canonicalization.
///
/// Semantically equivalent queries that are reordered or rephrased do not
/// match; execution and judge evaluation cover those.
pub fn exact_match(gold: &str, predicted: &str) -> bool {
    shared().exact_match(gold, predicted)
}
