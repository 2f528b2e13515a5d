//! Create-or-update decisions for catalog datasets.

use crate::errors::SyncError;
use crate::types::Service;
use serde::Serialize;
use std::fmt;

/// How to treat a dataset that already exists in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpsertMode {
    /// Replace the stored entry.
    #[default]
    CreateOrUpdate,
    /// Leave the stored entry alone.
    CreateOnly,
}

/// What to do for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertAction {
    Create,
    Update { id: String },
    Skip { id: String },
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update { id } => write!(f, "update {id}"),
            Self::Skip { id } => write!(f, "skip {id} (already exists)"),
        }
    }
}

/// Result of carrying out an [`UpsertAction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "id", rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
    Skipped(String),
}

impl UpsertOutcome {
    /// Catalog id of the dataset.
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Skipped(id) => id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Skipped(_) => "skipped",
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.id())
    }
}

/// Read a `GET` probe status as existence.
///
/// Only 404 means absent. Any other failure is an error: reading a 401 or
/// a 503 as "absent" would create a duplicate dataset.
pub fn existence_from_probe(status: u16, url: &str) -> Result<bool, SyncError> {
    match status {
        200..=299 => Ok(true),
        404 => Ok(false),
        _ => Err(SyncError::Status {
            service: Service::Catalog,
            method: "GET".to_string(),
            url: url.to_string(),
            status,
            message: "existence probe failed".to_string(),
        }),
    }
}

/// Decide between create, update and skip.
pub fn plan_upsert(existing_id: Option<&str>, mode: UpsertMode) -> UpsertAction {
    match (existing_id, mode) {
        (None, _) => UpsertAction::Create,
        (Some(id), UpsertMode::CreateOrUpdate) => UpsertAction::Update { id: id.to_string() },
        (Some(id), UpsertMode::CreateOnly) => UpsertAction::Skip { id: id.to_string() },
    }
}
