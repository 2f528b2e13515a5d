//! `snapshot`: convert a TDR snapshot into a catalog dataset.

use super::Context;
use super::helpers::{ensure_valid, read_json_file};
use crate::clients::catalog::ExistingLookup;
use crate::output::print_unmapped;
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::transform::{SnapshotModel, apply_overrides, snapshot_to_entry};
use catalog_sync_common::types::StorageSystem;
use catalog_sync_common::upsert::UpsertMode;
use clap::Args;
use serde_json::{Value, json};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// TDR snapshot id
    #[arg(long, required_unless_present = "snapshot_file")]
    pub snapshot_id: Option<String>,

    /// Read the TDR snapshot response from a file instead of TDR
    #[arg(long)]
    pub snapshot_file: Option<PathBuf>,

    /// Catalog id to update instead of searching the listing
    #[arg(long)]
    pub dataset_id: Option<String>,

    /// JSON object merged over the generated entry
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Print the entry without contacting the catalog
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &Context, args: &SnapshotArgs) -> Result<()> {
    let mut session = None;
    let snapshot: SnapshotModel = match (&args.snapshot_file, &args.snapshot_id) {
        (Some(path), _) => read_json_file(path)?,
        (None, Some(id)) => {
            let session = session.insert(ctx.session().await?);
            ctx.datarepo(session)?
                .get_snapshot(id)
                .await
                .with_context(|| format!("fetching snapshot {id}"))?
        }
        (None, None) => {
            return Err(SyncError::MissingValue {
                name: "snapshot",
                hint: "pass --snapshot-id or --snapshot-file",
            }
            .into());
        }
    };

    let (mut entry, report) = snapshot_to_entry(&snapshot, &ctx.config.datarepo_url.value);
    if let Some(path) = &args.overrides {
        let overrides: Value = read_json_file(path)?;
        apply_overrides(&mut entry, &overrides)
            .with_context(|| format!("applying overrides from {}", path.display()))?;
    }
    ensure_valid(&entry).context("checking the generated entry")?;
    print_unmapped(&report);

    if args.dry_run {
        ctx.format.print(&entry)?;
        return Ok(());
    }

    let session = match session {
        Some(session) => session,
        None => ctx.session().await?,
    };
    let lookup = match &args.dataset_id {
        Some(id) => ExistingLookup::DatasetId(id),
        None => ExistingLookup::FetchListing,
    };
    let outcome = ctx
        .catalog(&session)?
        .upsert(
            StorageSystem::DataRepo,
            &snapshot.id,
            &entry,
            lookup,
            UpsertMode::CreateOrUpdate,
        )
        .await
        .with_context(|| format!("syncing snapshot {} to the catalog", snapshot.id))?;

    if ctx.format.is_json() {
        ctx.format.print(&json!({
            "outcome": outcome,
            "storageSourceId": snapshot.id,
            "unmapped": report.unmapped,
        }))?;
    } else {
        println!("Catalog dataset {outcome} for snapshot {}", snapshot.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use mockito::Matcher;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/snapshot.json")
    }

    fn snapshot_args() -> SnapshotArgs {
        SnapshotArgs {
            snapshot_id: None,
            snapshot_file: None,
            dataset_id: None,
            overrides: None,
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_snapshot_file_is_created() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v1/datasets")
            .with_status(200)
            .with_body(r#"{"result":[]}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/datasets")
            .match_body(Matcher::PartialJson(json!({
                "storageSystem": "tdr",
                "storageSourceId": "0b7d5f2e-snap"
            })))
            .with_status(200)
            .with_body(r#"{"id":"c-new"}"#)
            .create_async()
            .await;

        let (ctx, _dir) = test_context(&server.url(), &[]);
        let args = SnapshotArgs {
            snapshot_file: Some(fixture()),
            ..snapshot_args()
        };
        run(&ctx, &args).await.unwrap();
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetched_snapshot_updates_listed_dataset() {
        let mut server = mockito::Server::new_async().await;
        let body = std::fs::read_to_string(fixture()).unwrap();
        let tdr = server
            .mock("GET", "/api/repository/v1/snapshots/0b7d5f2e-snap")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/api/v1/datasets")
            .with_status(200)
            .with_body(r#"{"result":[{"id":"c-3","dct:identifier":"0b7d5f2e-snap"}]}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/v1/datasets/c-3")
            .match_body(Matcher::PartialJson(json!({
                "dct:identifier": "0b7d5f2e-snap"
            })))
            .with_status(204)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/datasets")
            .expect(0)
            .create_async()
            .await;

        let (ctx, _dir) = test_context(&server.url(), &[]);
        let args = SnapshotArgs {
            snapshot_id: Some("0b7d5f2e-snap".to_string()),
            ..snapshot_args()
        };
        run(&ctx, &args).await.unwrap();

        tdr.assert_async().await;
        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_dataset_lookup_stops_the_sync() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/api/v1/datasets/c-3")
            .with_status(401)
            .with_body(r#"{"message":"token expired"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let update = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (ctx, _dir) = test_context(&server.url(), &[]);
        let args = SnapshotArgs {
            snapshot_file: Some(fixture()),
            dataset_id: Some("c-3".to_string()),
            ..snapshot_args()
        };
        let err = run(&ctx, &args).await.unwrap_err();

        assert_eq!(err.downcast_ref::<SyncError>().unwrap().status(), Some(401));
        create.assert_async().await;
        update.assert_async().await;
    }
}
