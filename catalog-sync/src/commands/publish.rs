//! `publish`: create a catalog dataset from a metadata file.

use super::Context;
use super::helpers::{ensure_valid, read_entry_file};
use anyhow::{Context as _, Result};
use catalog_sync_common::types::{CreateDatasetRequest, StorageSystem};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Storage system that owns the resource (wks, tdr, ext)
    #[arg(long)]
    pub storage_system: StorageSystem,

    /// Id of the resource in its storage system
    #[arg(long)]
    pub storage_source_id: String,

    /// JSON file holding the catalog entry
    #[arg(long)]
    pub metadata_file: PathBuf,

    /// Send the entry without local validation
    #[arg(long)]
    pub skip_validation: bool,
}

pub async fn run(ctx: &Context, args: &PublishArgs) -> Result<()> {
    let entry = read_entry_file(&args.metadata_file)?;
    if !args.skip_validation {
        ensure_valid(&entry)
            .with_context(|| format!("validating {}", args.metadata_file.display()))?;
    }
    let request = CreateDatasetRequest::new(args.storage_system, &args.storage_source_id, &entry)?;

    let session = ctx.session().await?;
    let catalog = ctx.catalog(&session)?;
    info!(
        storage_system = %args.storage_system,
        storage_source_id = %args.storage_source_id,
        "publishing metadata"
    );
    let created = catalog
        .create_dataset(&request)
        .await
        .context("publishing metadata to the catalog")?;

    if ctx.format.is_json() {
        ctx.format.print(&json!({ "id": created.id }))?;
    } else {
        println!("Created catalog dataset {}", created.id);
    }
    Ok(())
}
