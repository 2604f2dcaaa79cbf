//! Logging configuration for the benchmark binary.
//!
//! Logs go to stderr by default, or to a file when one is given. `RUST_LOG`
//! always wins over the built-in default level.

use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Initializes logging to stderr, or to `log_file` when set.
///
/// If the log file cannot be created, falls back to stderr with a warning.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) {
    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter(verbose))
                    .with_writer(file)
                    .with_ansi(false) // No ANSI colors in file output
                    .init();
                return;
            }
            Err(e) => eprintln!("Warning: Could not create log file {}: {e}", path.display()),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

/// Creates the log file, truncating any previous run's log.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    File::create(path)
}
