//! Dataset loading for the benchmark.
//!
//! Reads a Spider-style examples document and its table-metadata document,
//! builds one schema entry per database, and hands out deterministic samples.

mod schema;

pub use schema::{DatabaseSchema, PrimaryKey, TableMetadata};

use crate::config::DatasetConfig;
use crate::error::{BenchError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One benchmark example: a question, the database it targets, and the gold SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetExample {
    pub question: String,
    pub db_id: String,
    /// Spider stores the gold query under `query`.
    #[serde(rename = "query", alias = "gold_sql")]
    pub gold_sql: String,
}

/// Loads and serves the benchmark dataset.
#[derive(Debug)]
pub struct DataLoader {
    examples_path: PathBuf,
    tables_path: PathBuf,
    examples: Vec<DatasetExample>,
    schemas: HashMap<String, DatabaseSchema>,
    loaded: bool,
}

impl DataLoader {
    /// Creates a loader for the given dataset configuration. Nothing is read yet.
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            examples_path: config.examples_path(),
            tables_path: config.tables_path(),
            examples: Vec::new(),
            schemas: HashMap::new(),
            loaded: false,
        }
    }

    /// Creates a loader for a Spider directory using the default file names.
    pub fn from_dir(spider_dir: impl Into<PathBuf>) -> Self {
        Self::new(&DatasetConfig {
            spider_dir: spider_dir.into(),
            ..Default::default()
        })
    }

    /// Reads both documents and builds the schema cache.
    ///
    /// Fails with a dataset error if either document is absent or malformed.
    /// Calling this again after a successful load is a no-op.
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            debug!("Dataset already loaded, skipping");
            return Ok(());
        }

        ensure_exists(&self.examples_path, "Examples file")?;
        ensure_exists(&self.tables_path, "Tables file")?;

        let examples: Vec<DatasetExample> = read_json(&self.examples_path)?;
        let tables: Vec<TableMetadata> = read_json(&self.tables_path)?;

        let mut schemas = HashMap::with_capacity(tables.len());
        for metadata in tables {
            let db_id = metadata.db_id.clone();
            let schema = DatabaseSchema::from_metadata(metadata);
            if schemas.insert(db_id.clone(), schema).is_some() {
                warn!("Duplicate table metadata for '{}', keeping the last", db_id);
            }
        }

        info!(
            "Loaded {} examples from {}",
            examples.len(),
            self.examples_path.display()
        );
        info!("Loaded {} database schemas", schemas.len());

        self.examples = examples;
        self.schemas = schemas;
        self.loaded = true;
        Ok(())
    }

    /// Returns true once `load` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns up to `n` examples.
    ///
    /// With `shuffle`, a seeded random subset in sampled order; otherwise the
    /// first `n` examples. Requests beyond the dataset size return everything.
    pub fn get_samples(&self, n: usize, shuffle: bool, seed: u64) -> Vec<&DatasetExample> {
        let count = n.min(self.examples.len());

        if shuffle {
            let mut rng = StdRng::seed_from_u64(seed);
            rand::seq::index::sample(&mut rng, self.examples.len(), count)
                .into_iter()
                .map(|idx| &self.examples[idx])
                .collect()
        } else {
            self.examples.iter().take(count).collect()
        }
    }

    /// Returns the schema text for a database, or an empty string if unknown.
    pub fn get_schema(&self, db_id: &str) -> &str {
        self.schemas
            .get(db_id)
            .map(|schema| schema.schema_text.as_str())
            .unwrap_or("")
    }

    /// Returns the raw table metadata for a database.
    pub fn get_table_info(&self, db_id: &str) -> Option<&TableMetadata> {
        self.schemas.get(db_id).map(|schema| &schema.metadata)
    }

    /// Returns all loaded examples in document order.
    pub fn examples(&self) -> &[DatasetExample] {
        &self.examples
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    pub fn database_count(&self) -> usize {
        self.schemas.len()
    }
}

fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(BenchError::dataset(format!(
            "{what} not found at {}",
            path.display()
        )))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BenchError::dataset(format!("Failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| BenchError::dataset(format!("Failed to parse {}: {e}", path.display())))
}
