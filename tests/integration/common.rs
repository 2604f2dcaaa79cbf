//! Shared fixtures: a temporary Spider directory and SQLite databases.

use std::fs;
use std::path::{Path, PathBuf};

use nl2sql_bench::config::RunConfig;
use nl2sql_bench::dataset::DataLoader;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tempfile::{tempdir, TempDir};

/// Table metadata for two databases, one with a composite primary key.
pub const TABLES_JSON: &str = r#"[
  {
    "db_id": "concert_singer",
    "table_names_original": ["singer", "stadium"],
    "column_names_original": [
      [-1, "*"],
      [0, "Singer_ID"], [0, "Name"], [0, "Country"], [0, "Age"],
      [1, "Stadium_ID"], [1, "Name"], [1, "Capacity"]
    ],
    "column_types": ["text", "number", "text", "text", "number", "number", "text", "number"],
    "primary_keys": [1, 5]
  },
  {
    "db_id": "pets_1",
    "table_names_original": ["Has_Pet"],
    "column_names_original": [[-1, "*"], [0, "StuID"], [0, "PetID"]],
    "column_types": ["text", "number", "number"],
    "primary_keys": [[1, 2]]
  }
]"#;

/// Rows for the `concert_singer` database.
pub const CONCERT_SINGER_SQL: &str = "
    CREATE TABLE singer (Singer_ID INTEGER PRIMARY KEY, Name TEXT, Country TEXT, Age INTEGER);
    INSERT INTO singer VALUES (1, 'Joe Sharp', 'Netherlands', 52);
    INSERT INTO singer VALUES (2, 'Timbaland', 'United States', 32);
    INSERT INTO singer VALUES (3, 'Justin Brown', 'France', 29);
    INSERT INTO singer VALUES (4, 'Rose White', 'France', 41);
    CREATE TABLE stadium (Stadium_ID INTEGER PRIMARY KEY, Name TEXT, Capacity INTEGER);
    INSERT INTO stadium VALUES (1, 'Raith Rovers', 10104);
    INSERT INTO stadium VALUES (2, 'Ayr United', 11998);
";

/// A Spider-style directory under a temp dir.
pub struct SpiderFixture {
    dir: TempDir,
}

impl SpiderFixture {
    /// Writes `dev.json` from (question, db_id, query) triples and `tables.json`.
    pub fn new(examples: &[(&str, &str, &str)]) -> Self {
        let dir = tempdir().unwrap();
        let examples: Vec<serde_json::Value> = examples
            .iter()
            .map(|(question, db_id, query)| {
                serde_json::json!({ "question": question, "db_id": db_id, "query": query })
            })
            .collect();
        fs::write(
            dir.path().join("dev.json"),
            serde_json::to_string_pretty(&examples).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("tables.json"), TABLES_JSON).unwrap();
        Self { dir }
    }

    /// A fixture with `n` singer-count questions.
    pub fn with_count_questions(n: usize) -> Self {
        let questions: Vec<String> = (0..n).map(|i| format!("Question number {i}")).collect();
        let examples: Vec<(&str, &str, &str)> = questions
            .iter()
            .map(|q| (q.as_str(), "concert_singer", "SELECT count(*) FROM singer"))
            .collect();
        Self::new(&examples)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn loader(&self) -> DataLoader {
        DataLoader::from_dir(self.path())
    }

    pub fn databases_dir(&self) -> PathBuf {
        self.path().join("database")
    }

    /// Creates `database/<db_id>/<file_stem>.sqlite` and runs `script` in it.
    pub async fn create_database(&self, db_id: &str, file_stem: &str, script: &str) -> PathBuf {
        let db_dir = self.databases_dir().join(db_id);
        fs::create_dir_all(&db_dir).unwrap();
        let path = db_dir.join(format!("{file_stem}.sqlite"));

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
        sqlx::raw_sql(script).execute(&mut conn).await.unwrap();
        conn.close().await.unwrap();
        path
    }

    pub async fn create_concert_singer(&self) -> PathBuf {
        self.create_database("concert_singer", "concert_singer", CONCERT_SINGER_SQL)
            .await
    }
}

/// Run options for tests: first `samples` examples, nothing persisted.
pub fn options(samples: usize) -> RunConfig {
    RunConfig {
        samples,
        shuffle: false,
        save_results: false,
        ..RunConfig::default()
    }
}
