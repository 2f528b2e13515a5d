//! Data use restriction labels → `TerraCore:*` permissions.

use super::{MappingReport, normalize};

/// Look up the permission for a primary code or a full label.
fn lookup_exact(key: &str) -> Option<&'static str> {
    let permission = match key {
        "gru" | "general research use" => "TerraCore:GeneralResearchUse",
        "hmb" | "health/medical/biomedical" | "health medical biomedical" => {
            "TerraCore:HealthMedicalBiomedicalUse"
        }
        "ds" | "disease-specific" | "disease specific" => "TerraCore:DiseaseSpecificUse",
        "nres" | "no restrictions" | "no restriction" | "unrestricted" => {
            "TerraCore:NoRestriction"
        }
        "poa" | "population origins/ancestry" => "TerraCore:PopulationOriginsAncestryResearch",
        "npu" | "not-for-profit use only" => "TerraCore:NotForProfitUse",
        _ => return None,
    };
    Some(permission)
}

/// Look up the permission for a raw restriction label or consent code.
///
/// `DS-CA` and `Disease-Specific (Cancer)` map to disease specific use;
/// a compound code such as `HMB-IRB-PUB` maps by its leading code.
pub fn lookup_policy(raw: &str) -> Option<&'static str> {
    let key = normalize(raw);
    if let Some(permission) = lookup_exact(&key) {
        return Some(permission);
    }
    if key.starts_with("ds-")
        || key.starts_with("disease-specific ")
        || key.starts_with("disease-specific (")
    {
        return Some("TerraCore:DiseaseSpecificUse");
    }
    let (leading, rest) = key.split_once('-')?;
    if rest.is_empty() || leading.contains(' ') {
        return None;
    }
    lookup_exact(leading)
}

/// Map a raw label, recording it under `field` when nothing matches.
pub fn map_policy(raw: &str, field: &str, report: &mut MappingReport) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    match lookup_policy(raw) {
        Some(permission) => Some(permission.to_string()),
        None => {
            report.record(field, raw);
            None
        }
    }
}
