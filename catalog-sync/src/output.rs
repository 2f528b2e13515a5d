//! Command output and error rendering.
//!
//! Results go to stdout; logs, progress and diagnostics go to stderr.

use catalog_sync_common::errors::SyncError;
use catalog_sync_common::mapping::MappingReport;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// `--format` values.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single-line JSON, for scripts.
    Json,
    /// Human-readable text and indented JSON.
    #[default]
    Pretty,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == Self::Json
    }

    /// Serialize a value for stdout.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String, SyncError> {
        match self {
            Self::Json => serde_json::to_string(value),
            Self::Pretty => serde_json::to_string_pretty(value),
        }
        .map_err(SyncError::Serialize)
    }

    pub fn print<T: Serialize>(self, value: &T) -> Result<(), SyncError> {
        println!("{}", self.render(value)?);
        Ok(())
    }
}

/// Tell the operator which source values had no catalog mapping.
pub fn print_unmapped(report: &MappingReport) {
    if report.is_empty() {
        return;
    }
    eprintln!(
        "{} {} value(s) had no catalog mapping and were left out:",
        "note:".yellow().bold(),
        report.len()
    );
    for unmapped in report.iter() {
        eprintln!("  {} = {:?}", unmapped.field, unmapped.value);
    }
}

/// Render a command failure with its catalog code and remediation steps.
pub fn render_error(err: &anyhow::Error) -> String {
    let mut out = format!("{} {err:#}\n", "error:".red().bold());
    if let Some(sync) = err.chain().find_map(|cause| cause.downcast_ref::<SyncError>()) {
        out.push('\n');
        out.push_str(&sync.code().entry().format_full());
    }
    out
}
