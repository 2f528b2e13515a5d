//! Local checks for catalog entries before they are sent.
//!
//! The catalog service validates entries against its JSON schema. These
//! checks cover the fields this tool writes so a bad entry fails before
//! any request is made.

use crate::types::json_type_name;
use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One problem found in an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location in the entry, e.g. `/counts/donors`.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

const ARRAY_FIELDS: [&str; 4] = [
    "storage",
    "TerraDCAT_ap:hasDataCollection",
    "contributors",
    "prov:wasGeneratedBy",
];

const DATE_FIELDS: [&str; 2] = ["dct:issued", "dct:modified"];

/// Check an entry. An empty result means the entry is acceptable.
pub fn validate_entry(entry: &Value) -> Vec<ValidationIssue> {
    let Value::Object(map) = entry else {
        return vec![ValidationIssue::new(
            "/",
            format!("entry must be an object, found {}", json_type_name(entry)),
        )];
    };

    let mut issues = Vec::new();
    check_title(map, &mut issues);

    if let Some(description) = map.get("dct:description")
        && !description.is_string()
    {
        issues.push(ValidationIssue::new(
            "/dct:description",
            format!("must be a string, found {}", json_type_name(description)),
        ));
    }

    for field in DATE_FIELDS {
        match map.get(field) {
            None => {}
            Some(Value::String(text)) => {
                if DateTime::parse_from_rfc3339(text).is_err() {
                    issues.push(ValidationIssue::new(
                        format!("/{field}"),
                        format!("'{text}' is not an RFC 3339 timestamp"),
                    ));
                }
            }
            Some(other) => issues.push(ValidationIssue::new(
                format!("/{field}"),
                format!("must be a timestamp string, found {}", json_type_name(other)),
            )),
        }
    }

    for field in ARRAY_FIELDS {
        if let Some(value) = map.get(field)
            && !value.is_array()
        {
            issues.push(ValidationIssue::new(
                format!("/{field}"),
                format!("must be an array, found {}", json_type_name(value)),
            ));
        }
    }

    check_counts(map, &mut issues);
    issues
}

fn check_title(map: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    match map.get("dct:title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        Some(Value::String(_)) => {
            issues.push(ValidationIssue::new("/dct:title", "must not be empty"));
        }
        Some(other) => issues.push(ValidationIssue::new(
            "/dct:title",
            format!("must be a string, found {}", json_type_name(other)),
        )),
        None => issues.push(ValidationIssue::new("/dct:title", "is required")),
    }
}

fn check_counts(map: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    let Some(counts) = map.get("counts") else {
        return;
    };
    let Value::Object(counts) = counts else {
        issues.push(ValidationIssue::new(
            "/counts",
            format!("must be an object, found {}", json_type_name(counts)),
        ));
        return;
    };
    for (key, value) in counts {
        if value.as_u64().is_none() {
            issues.push(ValidationIssue::new(
                format!("/counts/{key}"),
                format!("must be a non-negative integer, found {value}"),
            ));
        }
    }
}
