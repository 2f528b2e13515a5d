//! Shared helper functions for commands.

use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::CatalogEntry;
use catalog_sync_common::validate::validate_entry;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Indent each line of text with a given prefix.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
    }
    out
}

/// Format a duration in seconds as a human-readable string.
pub fn humanize_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Read and parse a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, SyncError> {
    let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file holding one catalog entry object.
pub fn read_entry_file(path: &Path) -> Result<CatalogEntry, SyncError> {
    let value: Value = read_json_file(path)?;
    CatalogEntry::from_value(value).map_err(|err| match err {
        SyncError::NotAnObject { found, .. } => SyncError::NotAnObject {
            context: path.display().to_string(),
            found,
        },
        other => other,
    })
}

/// Fail with every validation issue when the entry is not acceptable.
pub fn ensure_valid(entry: &CatalogEntry) -> Result<(), SyncError> {
    let issues = validate_entry(&entry.clone().into_value());
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation { issues })
    }
}
