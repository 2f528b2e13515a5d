//! Core types shared between the CLI and the transforms.

use crate::errors::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Terra deployment an operator targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    #[default]
    Dev,
    Alpha,
    Staging,
    Perf,
}

impl Environment {
    /// All environments, in the order they are offered on the command line.
    pub const ALL: [Environment; 5] = [
        Environment::Prod,
        Environment::Dev,
        Environment::Alpha,
        Environment::Staging,
        Environment::Perf,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Dev => "dev",
            Self::Alpha => "alpha",
            Self::Staging => "staging",
            Self::Perf => "perf",
        }
    }

    /// Default catalog service root for this environment.
    pub fn catalog_url(&self) -> String {
        format!("https://catalog.dsde-{}.broadinstitute.org", self.name())
    }

    /// Default Rawls root for this environment.
    pub fn rawls_url(&self) -> String {
        format!("https://rawls.dsde-{}.broadinstitute.org", self.name())
    }

    /// Default Terra Data Repo root for this environment.
    pub fn datarepo_url(&self) -> String {
        match self {
            Self::Prod => "https://data.terra.bio".to_string(),
            Self::Dev => "https://jade.datarepo-dev.broadinstitute.org".to_string(),
            Self::Alpha => "https://data.alpha.envs-terra.bio".to_string(),
            Self::Staging => "https://data.staging.envs-terra.bio".to_string(),
            Self::Perf => "https://jade-perf.datarepo-perf.broadinstitute.org".to_string(),
        }
    }

    /// Default Terra UI root, used for workspace access links.
    pub fn terra_ui_url(&self) -> String {
        match self {
            Self::Prod => "https://app.terra.bio".to_string(),
            other => format!("https://bvdp-saturn-{}.appspot.com", other.name()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|env| env.name() == lower)
            .ok_or_else(|| SyncError::UnknownValue {
                kind: "environment",
                value: s.to_string(),
                expected: "prod, dev, alpha, staging, perf",
            })
    }
}

/// Storage system that owns the underlying resource of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageSystem {
    /// Terra workspace (Rawls).
    #[serde(rename = "wks")]
    Workspace,
    /// Terra Data Repo snapshot.
    #[serde(rename = "tdr")]
    DataRepo,
    /// Resource outside Terra.
    #[serde(rename = "ext")]
    External,
}

impl StorageSystem {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Workspace => "wks",
            Self::DataRepo => "tdr",
            Self::External => "ext",
        }
    }
}

impl fmt::Display for StorageSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StorageSystem {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "wks" => Ok(Self::Workspace),
            "tdr" => Ok(Self::DataRepo),
            "ext" => Ok(Self::External),
            other => Err(SyncError::UnknownValue {
                kind: "storage system",
                value: other.to_string(),
                expected: "wks, tdr, ext",
            }),
        }
    }
}

/// Remote service a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Catalog,
    Rawls,
    DataRepo,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("catalog"),
            Self::Rawls => f.write_str("rawls"),
            Self::DataRepo => f.write_str("datarepo"),
        }
    }
}

/// A catalog entry: the JSON object stored by the catalog service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntry(Map<String, Value>);

impl CatalogEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SyncError::NotAnObject {
                context: "catalog entry".to_string(),
                found: json_type_name(&other),
            }),
        }
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Insert a list only when it is non-empty.
    pub fn insert_list(&mut self, key: &str, values: Vec<Value>) {
        if !values.is_empty() {
            self.insert(key, Value::Array(values));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `dct:identifier` of the entry, used to find existing catalog datasets.
    pub fn identifier(&self) -> Option<&str> {
        self.get_str("dct:identifier")
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("dct:title")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_json_string(&self) -> Result<String, SyncError> {
        serde_json::to_string(&self.0).map_err(SyncError::Serialize)
    }
}

/// Body of `POST /api/v1/datasets`.
///
/// The catalog stores the entry as a string, so `catalog_entry` is the
/// serialized JSON object rather than a nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatasetRequest {
    pub storage_system: StorageSystem,
    pub storage_source_id: String,
    pub catalog_entry: String,
}

impl CreateDatasetRequest {
    pub fn new(
        storage_system: StorageSystem,
        storage_source_id: impl Into<String>,
        entry: &CatalogEntry,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            storage_system,
            storage_source_id: storage_source_id.into(),
            catalog_entry: entry.to_json_string()?,
        })
    }
}

/// Response of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDatasetId {
    pub id: String,
}

/// One element of the catalog listing.
///
/// `dct:title` and `dct:identifier` are read only when they are strings.
/// Any other value stays in `rest`, so one odd entry cannot fail a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct CatalogDataset {
    pub id: String,
    #[serde(rename = "dct:title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "dct:identifier", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for CatalogDataset {
    type Error = String;

    fn try_from(mut rest: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match rest.remove("id") {
            Some(Value::String(id)) => id,
            Some(other) => {
                return Err(format!(
                    "catalog dataset id must be a string, found {}",
                    json_type_name(&other)
                ));
            }
            None => return Err("catalog dataset is missing its id".to_string()),
        };
        fn take_string(rest: &mut Map<String, Value>, key: &str) -> Option<String> {
            if !rest.get(key).is_some_and(Value::is_string) {
                return None;
            }
            match rest.remove(key) {
                Some(Value::String(value)) => Some(value),
                _ => None,
            }
        }
        let title = take_string(&mut rest, "dct:title");
        let identifier = take_string(&mut rest, "dct:identifier");
        Ok(Self {
            id,
            title,
            identifier,
            rest,
        })
    }
}

/// Response of `GET /api/v1/datasets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetsListResponse {
    #[serde(default)]
    pub result: Vec<CatalogDataset>,
}

impl DatasetsListResponse {
    /// Find the catalog id of the dataset whose `dct:identifier` matches.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&CatalogDataset> {
        self.result
            .iter()
            .find(|dataset| dataset.identifier.as_deref() == Some(identifier))
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
