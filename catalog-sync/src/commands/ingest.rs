//! `ingest-collection`: publish a collection of TDR snapshot entries.
//!
//! Creating a catalog dataset for a snapshot requires steward access to the
//! snapshot, so each item is bracketed by adding the operator to the
//! snapshot's steward policy and removing them again.

use super::Context;
use super::helpers::{ensure_valid, humanize_duration, read_json_file};
use crate::clients::catalog::ExistingLookup;
use crate::clients::{CatalogClient, DataRepoClient};
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::{CatalogDataset, CatalogEntry, DatasetsListResponse, StorageSystem};
use catalog_sync_common::upsert::{UpsertMode, UpsertOutcome};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// JSON file of the form {"data": [entry, ...]}
    #[arg(long)]
    pub collection: PathBuf,

    /// Account given temporary steward access (defaults to USER_EMAIL)
    #[arg(long)]
    pub steward_email: Option<String>,

    /// Replace entries that already exist instead of skipping them
    #[arg(long)]
    pub update_existing: bool,

    /// Stop at the first failed item
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionFile {
    data: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct ItemFailure {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    error: String,
    /// What the item did to the catalog before it failed, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<UpsertOutcome>,
}

/// A failed item. `outcome` is set when the upsert went through and only
/// the steward removal afterwards failed.
#[derive(Debug)]
struct ItemError {
    error: SyncError,
    outcome: Option<UpsertOutcome>,
}

impl From<SyncError> for ItemError {
    fn from(error: SyncError) -> Self {
        Self {
            error,
            outcome: None,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct IngestSummary {
    total: usize,
    created: usize,
    updated: usize,
    skipped: usize,
    failures: Vec<ItemFailure>,
    elapsed: String,
}

impl IngestSummary {
    fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created(_) => self.created += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
            UpsertOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

pub async fn run(ctx: &Context, args: &IngestArgs) -> Result<()> {
    let collection: CollectionFile = read_json_file(&args.collection)?;
    let steward_email = args
        .steward_email
        .clone()
        .or_else(|| ctx.config.steward_email.value.clone())
        .ok_or(SyncError::MissingValue {
            name: "steward email",
            hint: "pass --steward-email or set USER_EMAIL",
        })?;
    let mode = if args.update_existing {
        UpsertMode::CreateOrUpdate
    } else {
        UpsertMode::CreateOnly
    };

    let session = ctx.session().await?;
    let catalog = ctx.catalog(&session)?;
    let tdr = ctx.datarepo(&session)?;
    let mut listing = catalog
        .list_datasets()
        .await
        .context("listing catalog datasets")?;

    let total = collection.data.len();
    info!(total, steward = %steward_email, ?mode, "ingesting collection");
    let progress = progress_bar(ctx, total)?;
    let started = Instant::now();
    let mut summary = IngestSummary {
        total,
        ..Default::default()
    };

    for (index, value) in collection.data.into_iter().enumerate() {
        let identifier = value
            .get("dct:identifier")
            .and_then(Value::as_str)
            .map(str::to_string);
        progress.set_message(identifier.clone().unwrap_or_default());

        let result = ingest_item(&catalog, &tdr, &mut listing, value, &steward_email, mode).await;
        progress.inc(1);
        match result {
            Ok(outcome) => {
                info!(index, identifier = ?identifier, %outcome, "ingested item");
                summary.record(&outcome);
            }
            Err(ItemError { error, outcome }) => {
                error!(index, identifier = ?identifier, %error, "item failed");
                if let Some(outcome) = &outcome {
                    summary.record(outcome);
                }
                summary.failures.push(ItemFailure {
                    index,
                    identifier,
                    error: error.to_string(),
                    outcome,
                });
                if args.fail_fast {
                    warn!("stopping at first failure");
                    break;
                }
            }
        }
    }
    progress.finish_and_clear();
    summary.elapsed = humanize_duration(started.elapsed().as_secs());

    if ctx.format.is_json() {
        ctx.format.print(&summary)?;
    } else {
        println!(
            "Ingested {} item(s) in {}: {} created, {} updated, {} skipped, {} failed",
            summary.total,
            summary.elapsed,
            summary.created,
            summary.updated,
            summary.skipped,
            summary.failures.len()
        );
        for failure in &summary.failures {
            let identifier = failure.identifier.as_deref().unwrap_or("(no identifier)");
            match &failure.outcome {
                Some(outcome) => println!(
                    "  #{} {identifier}: {} (catalog dataset {outcome})",
                    failure.index, failure.error
                ),
                None => println!("  #{} {identifier}: {}", failure.index, failure.error),
            }
        }
    }

    if !summary.failures.is_empty() {
        return Err(SyncError::BatchIncomplete {
            failed: summary.failures.len(),
            total,
        }
        .into());
    }
    Ok(())
}

fn progress_bar(ctx: &Context, total: usize) -> Result<ProgressBar> {
    if ctx.format.is_json() || !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {elapsed} {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Steward grant, upsert, steward removal for one collection item.
///
/// The removal runs whenever the grant succeeded, even if the upsert failed.
/// A dataset created here is added to `listing` before the removal result
/// is looked at, so a later duplicate of the item is never created twice.
async fn ingest_item(
    catalog: &CatalogClient,
    tdr: &DataRepoClient,
    listing: &mut DatasetsListResponse,
    value: Value,
    steward_email: &str,
    mode: UpsertMode,
) -> Result<UpsertOutcome, ItemError> {
    let entry = CatalogEntry::from_value(value)?;
    let snapshot_id = entry
        .identifier()
        .ok_or_else(|| SyncError::MissingField {
            field: "dct:identifier",
            context: "collection item".to_string(),
        })?
        .to_string();
    ensure_valid(&entry)?;

    tdr.add_steward(&snapshot_id, steward_email).await?;
    let upserted = catalog
        .upsert(
            StorageSystem::DataRepo,
            &snapshot_id,
            &entry,
            ExistingLookup::Listing(&*listing),
            mode,
        )
        .await;
    let removed = tdr.remove_steward(&snapshot_id, steward_email).await;

    let outcome = match upserted {
        Ok(outcome) => outcome,
        Err(error) => {
            if let Err(removal) = &removed {
                warn!(%snapshot_id, error = %removal, "steward removal also failed");
            }
            return Err(error.into());
        }
    };

    if let UpsertOutcome::Created(id) = &outcome {
        listing.result.push(CatalogDataset {
            id: id.clone(),
            title: entry.title().map(str::to_string),
            identifier: Some(snapshot_id),
            rest: Map::new(),
        });
    }

    match removed {
        Ok(()) => Ok(outcome),
        Err(error) => Err(ItemError {
            error,
            outcome: Some(outcome),
        }),
    }
}
