//! `datasets list` and `datasets get`.

use super::Context;
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::Service;
use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum DatasetsAction {
    /// List catalog datasets visible to the caller
    List,
    /// Print one stored catalog entry
    Get {
        /// Catalog dataset id
        #[arg(long)]
        id: String,
    },
}

pub async fn run(ctx: &Context, action: &DatasetsAction) -> Result<()> {
    let session = ctx.session().await?;
    let catalog = ctx.catalog(&session)?;

    match action {
        DatasetsAction::List => {
            let listing = catalog
                .list_datasets()
                .await
                .context("listing catalog datasets")?;
            if ctx.format.is_json() {
                ctx.format.print(&listing)?;
                return Ok(());
            }
            if listing.result.is_empty() {
                println!("No catalog datasets.");
            }
            for dataset in &listing.result {
                println!(
                    "{}  {}  ({})",
                    dataset.id,
                    dataset.title.as_deref().unwrap_or("(untitled)"),
                    dataset.identifier.as_deref().unwrap_or("-")
                );
            }
        }
        DatasetsAction::Get { id } => {
            let entry = catalog
                .get_dataset(id)
                .await
                .with_context(|| format!("fetching catalog dataset {id}"))?
                .ok_or_else(|| SyncError::Status {
                    service: Service::Catalog,
                    method: "GET".to_string(),
                    url: catalog.dataset_url(id),
                    status: 404,
                    message: "dataset not found".to_string(),
                })?;
            ctx.format.print(&entry)?;
        }
    }
    Ok(())
}
