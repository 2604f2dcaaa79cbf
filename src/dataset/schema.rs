//! Table metadata and schema-text synthesis.
//!
//! Spider ships one metadata record per database describing tables, columns,
//! column types and primary keys. The harness turns each record into a block
//! of `CREATE TABLE` statements that generators receive as context.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Table index Spider uses for the synthetic `*` column.
const ALL_COLUMNS_TABLE_INDEX: i64 = -1;

/// Type emitted when a column has no entry in `column_types`.
const FALLBACK_COLUMN_TYPE: &str = "TEXT";

/// Raw per-database table metadata, as found in `tables.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Database identifier.
    pub db_id: String,

    /// Table names as they appear in the database file.
    #[serde(rename = "table_names_original")]
    pub table_names: Vec<String>,

    /// Column names paired with the index of their owning table.
    #[serde(rename = "column_names_original")]
    pub column_names: Vec<(i64, String)>,

    /// Column type tags, parallel to `column_names`.
    #[serde(default)]
    pub column_types: Vec<String>,

    /// Primary-key column indices (single or composite).
    #[serde(default)]
    pub primary_keys: Vec<PrimaryKey>,
}

/// A primary key entry. Newer Spider releases nest composite keys as lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Column(usize),
    Composite(Vec<usize>),
}

impl TableMetadata {
    /// Returns every column index that participates in a primary key.
    pub fn primary_key_columns(&self) -> BTreeSet<usize> {
        self.primary_keys
            .iter()
            .flat_map(|pk| match pk {
                PrimaryKey::Column(idx) => vec![*idx],
                PrimaryKey::Composite(idxs) => idxs.clone(),
            })
            .collect()
    }

    /// Renders the metadata as `CREATE TABLE` statements.
    ///
    /// Columns are grouped under their owning table in table order; the
    /// all-columns sentinel is skipped, tables without columns are omitted,
    /// and statements are separated by a blank line.
    pub fn to_schema_text(&self) -> String {
        let primary_keys = self.primary_key_columns();

        let mut columns_by_table: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (idx, (table_idx, name)) in self.column_names.iter().enumerate() {
            if *table_idx == ALL_COLUMNS_TABLE_INDEX {
                continue;
            }
            let Ok(table_idx) = usize::try_from(*table_idx) else {
                continue;
            };

            let column_type = self
                .column_types
                .get(idx)
                .map(String::as_str)
                .unwrap_or(FALLBACK_COLUMN_TYPE)
                .to_uppercase();
            let pk = if primary_keys.contains(&idx) {
                " PRIMARY KEY"
            } else {
                ""
            };

            columns_by_table
                .entry(table_idx)
                .or_default()
                .push(format!("    {name} {column_type}{pk}"));
        }

        self.table_names
            .iter()
            .enumerate()
            .filter_map(|(table_idx, table_name)| {
                let columns = columns_by_table.get(&table_idx)?;
                Some(format!(
                    "CREATE TABLE {table_name} (\n{}\n);",
                    columns.join(",\n")
                ))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A database's metadata together with its synthesized schema text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSchema {
    pub db_id: String,
    pub schema_text: String,
    pub metadata: TableMetadata,
}

impl DatabaseSchema {
    /// Builds the schema entry for a metadata record.
    pub fn from_metadata(metadata: TableMetadata) -> Self {
        Self {
            db_id: metadata.db_id.clone(),
            schema_text: metadata.to_schema_text(),
            metadata,
        }
    }
}
