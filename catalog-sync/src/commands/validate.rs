//! `validate`: check a local entry file, or every entry in the catalog.

use super::Context;
use super::helpers::read_entry_file;
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::CatalogDataset;
use catalog_sync_common::validate::{ValidationIssue, validate_entry};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Listing fields added by the catalog service, not part of the stored entry.
const SERVICE_FIELDS: [&str; 2] = ["id", "accessLevel"];

#[derive(Args, Debug, Clone)]
#[command(group = clap::ArgGroup::new("target").required(true))]
pub struct ValidateArgs {
    /// JSON file holding one catalog entry
    #[arg(long, group = "target")]
    pub metadata_file: Option<PathBuf>,

    /// Validate every dataset in the catalog listing
    #[arg(long, group = "target")]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct DatasetReport {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    issues: Vec<ValidationIssue>,
}

pub async fn run(ctx: &Context, args: &ValidateArgs) -> Result<()> {
    match &args.metadata_file {
        Some(path) => validate_file(ctx, path),
        None => validate_catalog(ctx).await,
    }
}

fn validate_file(ctx: &Context, path: &Path) -> Result<()> {
    let entry = read_entry_file(path)?;
    let issues = validate_entry(&entry.into_value());

    if ctx.format.is_json() {
        ctx.format.print(&issues)?;
    } else if issues.is_empty() {
        println!("{} {}", "ok".green().bold(), path.display());
    } else {
        println!("{} {}", "invalid".red().bold(), path.display());
        for issue in &issues {
            println!("  {issue}");
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation { issues })
            .with_context(|| format!("validating {}", path.display()))
    }
}

async fn validate_catalog(ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    let listing = ctx
        .catalog(&session)?
        .list_datasets()
        .await
        .context("listing catalog datasets")?;

    let total = listing.result.len();
    let reports: Vec<DatasetReport> = listing
        .result
        .into_iter()
        .map(check_dataset)
        .collect::<Result<_, _>>()?;
    let invalid: Vec<&DatasetReport> = reports.iter().filter(|r| !r.issues.is_empty()).collect();
    info!(total, invalid = invalid.len(), "validated catalog listing");

    if ctx.format.is_json() {
        ctx.format.print(&invalid)?;
    } else {
        for report in &invalid {
            println!(
                "{} {} {}",
                "invalid".red().bold(),
                report.id,
                report.title.as_deref().unwrap_or("(untitled)")
            );
            for issue in &report.issues {
                println!("  {issue}");
            }
        }
        println!("{} of {} dataset(s) valid", total - invalid.len(), total);
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(SyncError::BatchIncomplete {
            failed: invalid.len(),
            total,
        }
        .into())
    }
}

fn check_dataset(dataset: CatalogDataset) -> Result<DatasetReport, SyncError> {
    let id = dataset.id.clone();
    let title = dataset.title.clone();
    let mut value = serde_json::to_value(dataset).map_err(SyncError::Serialize)?;
    if let Value::Object(map) = &mut value {
        for field in SERVICE_FIELDS {
            map.remove(field);
        }
    }
    Ok(DatasetReport {
        id,
        title,
        issues: validate_entry(&value),
    })
}
