//! Structured test logging.
//!
//! Tests that talk to mock servers or spawn the binary are easier to debug
//! with a JSONL trail. Call [`init_global_test_logging`] at the start of a
//! test; it is idempotent.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing_subscriber::prelude::*;

/// Overrides where the JSONL trail is written.
const LOG_FILE_ENV: &str = "CATALOG_SYNC_TEST_LOG_FILE";
/// Level for the catalog-sync crates (default `info`).
const LOG_LEVEL_ENV: &str = "CATALOG_SYNC_TEST_LOG_LEVEL";

static GLOBAL_LOGGING_INIT: Once = Once::new();

/// Install a JSON file subscriber plus a compact test-writer layer.
///
/// Output goes to `target/test-logs/all_tests.jsonl` unless
/// `CATALOG_SYNC_TEST_LOG_FILE` is set.
pub fn init_global_test_logging() {
    GLOBAL_LOGGING_INIT.call_once(|| {
        let file_layer = create_log_file().map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
        });

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        let filter = tracing_subscriber::EnvFilter::try_new(format!(
            "catalog_sync={level},catalog_sync_common={level}"
        ))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stderr_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn create_log_file() -> Option<std::fs::File> {
    let path = log_file_path(std::env::var_os(LOG_FILE_ENV).map(PathBuf::from), || {
        find_target_dir(std::env::var_os("CARGO_TARGET_DIR").map(PathBuf::from))
    });
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    std::fs::File::create(path).ok()
}

/// The explicit path if given, else `<target>/test-logs/all_tests.jsonl`.
fn log_file_path(explicit: Option<PathBuf>, target_dir: impl FnOnce() -> PathBuf) -> PathBuf {
    explicit.unwrap_or_else(|| target_dir().join("test-logs").join("all_tests.jsonl"))
}

/// `CARGO_TARGET_DIR`, else the nearest `target` directory above the cwd.
fn find_target_dir(cargo_target_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cargo_target_dir {
        return dir;
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    nearest_target(&cwd).unwrap_or_else(|| PathBuf::from("target"))
}

fn nearest_target(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("target"))
        .find(|target| target.is_dir())
}
