//! Lookup tables that turn free-text labels into catalog vocabulary.
//!
//! Workspace attributes and TDR consent codes were typed by hand over many
//! years, so the same concept appears under many spellings. Keys are
//! normalized with [`normalize`] before lookup. A value with no entry is
//! not an error; it is recorded in a [`MappingReport`] so operators can
//! extend the tables.

pub mod modality;
pub mod policy;

pub use modality::{MODALITY_PREFIX, lookup_modality, map_modalities};
pub use policy::{lookup_policy, map_policy};

use serde::Serialize;
use tracing::warn;

/// Normalize a label for lookup: trimmed, lowercase, `_` read as a space,
/// runs of whitespace collapsed to one space.
pub fn normalize(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A source value that no table entry matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedValue {
    /// Source attribute the value came from, e.g. `library:datatype`.
    pub field: String,
    pub value: String,
}

/// Values dropped during a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub unmapped: Vec<UnmappedValue>,
}

impl MappingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unmapped value. Duplicates are kept once.
    pub fn record(&mut self, field: &str, value: &str) {
        warn!(field, value, "no catalog mapping for value");
        let entry = UnmappedValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        if !self.unmapped.contains(&entry) {
            self.unmapped.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unmapped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.unmapped.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnmappedValue> {
        self.unmapped.iter()
    }

    pub fn merge(&mut self, other: MappingReport) {
        for entry in other.unmapped {
            if !self.unmapped.contains(&entry) {
                self.unmapped.push(entry);
            }
        }
    }
}
