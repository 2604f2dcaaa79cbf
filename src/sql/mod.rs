//! SQL text handling: canonicalization for exact match and validity checks.

mod normalizer;
mod validity;

pub use normalizer::{exact_match, normalize, SqlNormalizer};
pub use validity::{is_valid_sql, statement_count, SqlValidator};

use std::fmt;

/// The type of SQL statement detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Select,
    With,
    Insert,
    Update,
    Delete,
    Drop,
    Alter,
    Create,
    Explain,
    Pragma,
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::With => write!(f, "WITH (CTE)"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Alter => write!(f, "ALTER"),
            Self::Create => write!(f, "CREATE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Pragma => write!(f, "PRAGMA"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
