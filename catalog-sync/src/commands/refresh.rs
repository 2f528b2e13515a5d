//! `refresh-test-metadata`: overwrite catalog entries with test fixtures.
//!
//! The resources file maps a dataset title to the entry it should hold.
//! Every listed catalog dataset whose `dct:title` has a fixture is updated.

use super::Context;
use super::helpers::{indent_lines, read_json_file};
use crate::clients::CatalogClient;
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::DatasetsListResponse;
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct RefreshArgs {
    /// JSON object of dataset title to catalog entry
    #[arg(long, default_value = "resources.json")]
    pub resources: PathBuf,
}

#[derive(Debug, Default, Serialize)]
struct RefreshSummary {
    updated: Vec<String>,
    failed: Vec<String>,
    /// Titles with no fixture in the resources file.
    missing: Vec<String>,
}

pub async fn run(ctx: &Context, args: &RefreshArgs) -> Result<()> {
    let resources: Map<String, Value> = read_json_file(&args.resources)?;
    info!(fixtures = resources.len(), "loaded test metadata");

    let session = ctx.session().await?;
    let catalog = ctx.catalog(&session)?;
    let listing = catalog
        .list_datasets()
        .await
        .context("listing catalog datasets")?;

    let summary = refresh_datasets(&catalog, &listing, &resources).await;

    if ctx.format.is_json() {
        ctx.format.print(&summary)?;
    } else {
        println!(
            "Updated {} dataset(s), {} failed, {} without test metadata",
            summary.updated.len(),
            summary.failed.len(),
            summary.missing.len()
        );
    }

    if !summary.failed.is_empty() {
        return Err(SyncError::BatchIncomplete {
            failed: summary.failed.len(),
            total: summary.updated.len() + summary.failed.len(),
        }
        .into());
    }
    Ok(())
}

/// PUT the fixture for every listed dataset that has one. A failed update,
/// whether a rejected status or a transport error, is recorded and the
/// remaining datasets are still updated.
async fn refresh_datasets(
    catalog: &CatalogClient,
    listing: &DatasetsListResponse,
    resources: &Map<String, Value>,
) -> RefreshSummary {
    let mut summary = RefreshSummary::default();
    for dataset in &listing.result {
        let title = dataset.title.as_deref().unwrap_or_default();
        let Some(metadata) = resources.get(title) else {
            info!(id = %dataset.id, title, "no test metadata for dataset");
            summary.missing.push(title.to_string());
            continue;
        };

        info!(id = %dataset.id, title, "updating dataset");
        match catalog.update_dataset_raw(&dataset.id, metadata).await {
            Ok(response) if response.is_success() => summary.updated.push(dataset.id.clone()),
            Ok(response) => {
                warn!(id = %dataset.id, title, status = response.status, "update failed");
                eprintln!(
                    "Problem updating metadata for ({}, {}):\n{}",
                    dataset.id,
                    title,
                    indent_lines(&response.failure_dump(), "  ")
                );
                summary.failed.push(dataset.id.clone());
            }
            Err(err) => {
                warn!(id = %dataset.id, title, error = %err, "update failed");
                eprintln!(
                    "Problem updating metadata for ({}, {}): {err}",
                    dataset.id, title
                );
                summary.failed.push(dataset.id.clone());
            }
        }
    }
    summary
}
