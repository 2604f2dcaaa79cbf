//! Database access for execution evaluation.
//!
//! Runs SQL against embedded SQLite database files and converts the fetched
//! rows into backend-independent values.

mod sqlite;
mod types;

pub use sqlite::fetch_rows;
pub use types::{Row, Value};
