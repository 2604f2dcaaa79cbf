//! SQLite query execution.
//!
//! Every call opens its own read-only connection with a bounded busy timeout,
//! runs the statement, fetches all rows and closes the connection again,
//! whether the query succeeded or not. A progress handler interrupts the
//! statement once the deadline passes.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Row as _, TypeInfo, ValueRef};
use tracing::debug;

use super::types::{Row, Value};
use crate::error::{BenchError, Result};
use crate::sql::statement_count;

/// Virtual machine instructions between deadline checks.
const PROGRESS_INTERVAL_OPS: i32 = 1000;

/// Runs `sql` against the database file at `path` and returns every row.
///
/// `timeout` bounds opening the file, waiting on a locked database and
/// running the statement. Only a single statement is accepted.
pub async fn fetch_rows(path: &Path, sql: &str, timeout: Duration) -> Result<Vec<Row>> {
    if statement_count(sql) > 1 {
        return Err(BenchError::query("You can only execute one statement at a time."));
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .busy_timeout(timeout);

    let mut conn = tokio::time::timeout(timeout, SqliteConnection::connect_with(&options))
        .await
        .map_err(|_| BenchError::query(format!("Timed out opening {}", path.display())))?
        .map_err(|e| BenchError::query(format!("Failed to open {}: {e}", path.display())))?;

    let fetched = match arm_deadline(&mut conn, timeout).await {
        Ok(interrupted) => {
            let fetched = sqlx::raw_sql(sql).fetch_all(&mut conn).await;
            if interrupted.load(Ordering::Relaxed) {
                Err(BenchError::query(format!(
                    "Query timed out after {}s",
                    timeout.as_secs_f64()
                )))
            } else {
                fetched.map_err(|e| BenchError::query(describe_sqlx_error(&e)))
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = conn.close().await {
        debug!("Failed to close connection to {}: {e}", path.display());
    }

    fetched.map(|rows| rows.iter().map(convert_row).collect())
}

/// Installs a progress handler that aborts the running statement after `timeout`.
///
/// The returned flag is set when the handler fired.
async fn arm_deadline(conn: &mut SqliteConnection, timeout: Duration) -> Result<Arc<AtomicBool>> {
    let deadline = Instant::now() + timeout;
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);

    let mut handle = conn
        .lock_handle()
        .await
        .map_err(|e| BenchError::query(describe_sqlx_error(&e)))?;
    handle.set_progress_handler(PROGRESS_INTERVAL_OPS, move || {
        if Instant::now() < deadline {
            true
        } else {
            flag.store(true, Ordering::Relaxed);
            false
        }
    });

    Ok(interrupted)
}

/// Prefers the engine's own message over sqlx's wrapper text.
fn describe_sqlx_error(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single column value, keyed on the value's storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => row
            .try_get_unchecked::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get_unchecked::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT and anything else SQLite can render as text
        _ => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
