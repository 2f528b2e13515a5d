//! `library:datatype` → `TerraCore:hasDataModality` terms.

use super::{MappingReport, normalize};

/// Namespace of every modality term.
pub const MODALITY_PREFIX: &str = "TerraCoreValueSets:";

/// Look up the modality terms (without prefix) for a raw label.
pub fn lookup_modality(raw: &str) -> Option<&'static [&'static str]> {
    let terms: &'static [&'static str] = match normalize(raw).as_str() {
        "whole genome" | "whole genome sequencing" | "wgs" => &["Genomic_WholeGenome"],
        "exome" | "whole exome" | "whole exome sequencing" | "wes" => &["Genomic_Exome"],
        "genotyping array" | "snp array" | "genotyping" => &["Genomic_Genotyping_Targeted"],
        "targeted sequencing" | "panel sequencing" => &["Genomic_Targeted"],
        "rna-seq" | "rnaseq" | "rna seq" | "transcriptome" | "transcriptomic" => {
            &["Transcriptomic"]
        }
        "single cell rna-seq" | "scrna-seq" => &["Transcriptomic", "SingleCell"],
        "methylation" | "bisulfite sequencing" | "chip-seq" | "atac-seq" | "epigenomic" => {
            &["Epigenomic"]
        }
        "proteomic" | "proteomics" => &["Proteomic"],
        "metabolomic" | "metabolomics" => &["Metabolomic"],
        "imaging" | "microscopy" | "mri" => &["Imaging"],
        "clinical" | "phenotype" | "phenotypic" => &["Phenotypic"],
        "microbiome" | "16s" => &["Microbiome"],
        "genomic" => &["Genomic"],
        _ => return None,
    };
    Some(terms)
}

/// Map every raw label to prefixed terms, de-duplicated in first-seen order.
///
/// Blank labels are skipped; unknown labels are recorded under `field`.
pub fn map_modalities<I, S>(values: I, field: &str, report: &mut MappingReport) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut mapped: Vec<String> = Vec::new();
    for value in values {
        let raw = value.as_ref();
        if raw.trim().is_empty() {
            continue;
        }
        match lookup_modality(raw) {
            Some(terms) => {
                for term in terms {
                    let full = format!("{MODALITY_PREFIX}{term}");
                    if !mapped.contains(&full) {
                        mapped.push(full);
                    }
                }
            }
            None => report.record(field, raw),
        }
    }
    mapped
}
