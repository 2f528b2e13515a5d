//! Conversions from source resources to catalog entries.

pub mod attributes;
pub mod snapshot;
pub mod workspace;

pub use snapshot::{SnapshotModel, snapshot_to_entry};
pub use workspace::{WorkspaceDetails, WorkspaceResponse, workspace_to_entry};

use crate::errors::SyncError;
use crate::types::{CatalogEntry, json_type_name};
use serde_json::Value;

/// Shallow-merge operator overrides onto a generated entry.
///
/// Override keys replace generated ones; a `null` override removes the key.
pub fn apply_overrides(entry: &mut CatalogEntry, overrides: &Value) -> Result<(), SyncError> {
    let Value::Object(map) = overrides else {
        return Err(SyncError::NotAnObject {
            context: "overrides".to_string(),
            found: json_type_name(overrides),
        });
    };
    for (key, value) in map {
        if value.is_null() {
            entry.remove(key);
        } else {
            entry.insert(key, value.clone());
        }
    }
    Ok(())
}
