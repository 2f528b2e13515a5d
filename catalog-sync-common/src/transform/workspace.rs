//! Rawls workspace → catalog entry.

use super::attributes::{attr_list, attr_string, attr_u64};
use crate::mapping::{MappingReport, map_modalities, map_policy};
use crate::types::CatalogEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Response of `GET /api/workspaces/{namespace}/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub workspace: WorkspaceDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDetails {
    pub workspace_id: String,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Build a catalog entry from a workspace.
///
/// `terra_ui_url` is the root used for the `dcat:accessURL` link.
pub fn workspace_to_entry(
    response: &WorkspaceResponse,
    terra_ui_url: &str,
) -> (CatalogEntry, MappingReport) {
    let ws = &response.workspace;
    let attrs = &ws.attributes;
    let mut report = MappingReport::new();
    let mut entry = CatalogEntry::new();

    entry.insert("dct:identifier", ws.workspace_id.as_str());
    entry.insert(
        "dct:title",
        attr_string(attrs, "library:datasetName").unwrap_or_else(|| ws.name.clone()),
    );
    entry.insert(
        "dct:description",
        attr_string(attrs, "library:datasetDescription")
            .or_else(|| attr_string(attrs, "description"))
            .unwrap_or_default(),
    );
    entry.insert_opt(
        "dct:creator",
        attr_string(attrs, "library:datasetOwner").or_else(|| ws.created_by.clone()),
    );
    entry.insert_opt("dct:issued", ws.created_date.clone());
    entry.insert_opt("dct:modified", ws.last_modified.clone());
    entry.insert(
        "dcat:accessURL",
        format!(
            "{}/#workspaces/{}/{}",
            terra_ui_url.trim_end_matches('/'),
            ws.namespace,
            ws.name
        ),
    );

    if let Some(restriction) = attr_string(attrs, "library:dataUseRestriction") {
        entry.insert_opt(
            "TerraDCAT_ap:hasDataUsePermission",
            map_policy(&restriction, "library:dataUseRestriction", &mut report),
        );
    }
    entry.insert_opt("TerraDCAT_ap:hasOwner", attr_string(attrs, "library:datasetOwner"));
    entry.insert_list(
        "TerraDCAT_ap:hasCustodian",
        attr_list(attrs, "library:datasetCustodian")
            .into_iter()
            .map(Value::from)
            .collect(),
    );

    let modalities = map_modalities(
        attr_list(attrs, "library:datatype"),
        "library:datatype",
        &mut report,
    );
    if !modalities.is_empty() {
        entry.insert(
            "prov:wasGeneratedBy",
            json!([{ "TerraCore:hasDataModality": modalities }]),
        );
    }

    if let Some(project) = attr_string(attrs, "library:projectName") {
        entry.insert(
            "TerraDCAT_ap:hasDataCollection",
            json!([{ "dct:title": project }]),
        );
    }

    if let Some(email) = attr_string(attrs, "library:contactEmail") {
        let mut contributor = Map::new();
        if let Some(name) = attr_string(attrs, "library:datasetDepositor") {
            contributor.insert("name".to_string(), Value::from(name));
        }
        contributor.insert("email".to_string(), Value::from(email));
        contributor.insert("correspondingContributor".to_string(), Value::Bool(true));
        entry.insert("contributors", json!([contributor]));
    }

    let mut diseases = attr_list(attrs, "library:indication");
    for site in attr_list(attrs, "library:primaryDiseaseSite") {
        if !diseases.contains(&site) {
            diseases.push(site);
        }
    }
    if !diseases.is_empty() {
        entry.insert("samples", json!({ "disease": diseases }));
    }

    match attr_u64(attrs, "library:numSubjects") {
        Some(donors) => entry.insert("counts", json!({ "donors": donors })),
        None => {
            if let Some(raw) = attr_string(attrs, "library:numSubjects") {
                report.record("library:numSubjects", &raw);
            }
        }
    }

    let mut storage = Map::new();
    storage.insert("cloudPlatform".to_string(), Value::from("gcp"));
    storage.insert("cloudResource".to_string(), Value::from("bucket"));
    if let Some(bucket) = ws.bucket_name.as_deref().filter(|b| !b.is_empty()) {
        storage.insert("bucket".to_string(), Value::from(bucket));
    }
    entry.insert("storage", json!([storage]));

    (entry, report)
}
