//! TDR snapshot → catalog entry.

use crate::mapping::{MappingReport, map_policy};
use crate::types::CatalogEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Response of `GET /api/repository/v1/snapshots/{id}`, the fields we read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub consent_code: Option<String>,
    /// `gcp` or `azure`; older snapshots omit it.
    #[serde(default)]
    pub cloud_platform: Option<String>,
    #[serde(default)]
    pub source: Vec<SnapshotSource>,
    #[serde(default)]
    pub tables: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub dataset: SourceDataset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Build a catalog entry from a snapshot.
///
/// `datarepo_url` is the root used for the `dcat:accessURL` link.
pub fn snapshot_to_entry(
    snapshot: &SnapshotModel,
    datarepo_url: &str,
) -> (CatalogEntry, MappingReport) {
    let mut report = MappingReport::new();
    let mut entry = CatalogEntry::new();

    entry.insert("dct:identifier", snapshot.id.as_str());
    entry.insert("dct:title", snapshot.name.as_str());
    entry.insert(
        "dct:description",
        snapshot.description.clone().unwrap_or_default(),
    );
    entry.insert_opt("dct:issued", snapshot.created_date.clone());
    entry.insert(
        "dcat:accessURL",
        format!(
            "{}/snapshots/details/{}",
            datarepo_url.trim_end_matches('/'),
            snapshot.id
        ),
    );

    entry.insert_list(
        "TerraDCAT_ap:hasDataCollection",
        snapshot
            .source
            .iter()
            .map(|source| {
                json!({
                    "dct:identifier": source.dataset.id,
                    "dct:title": source.dataset.name,
                })
            })
            .collect(),
    );

    if let Some(code) = snapshot.consent_code.as_deref().filter(|c| !c.trim().is_empty()) {
        entry.insert("TerraDCAT_ap:hasConsentGroup", code);
        entry.insert_opt(
            "TerraDCAT_ap:hasDataUsePermission",
            map_policy(code, "consentCode", &mut report),
        );
    }

    let platform = snapshot
        .cloud_platform
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "gcp".to_string());
    let resource = if platform == "azure" {
        "storage_account"
    } else {
        "bigquery"
    };
    entry.insert(
        "storage",
        json!([{ "cloudPlatform": platform, "cloudResource": resource }]),
    );
    entry.insert("counts", json!({ "tables": snapshot.tables.len() }));

    (entry, report)
}
