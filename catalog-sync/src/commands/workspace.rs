//! `workspace`: convert a Rawls workspace into a catalog dataset.

use super::Context;
use super::helpers::{ensure_valid, read_json_file};
use crate::clients::catalog::ExistingLookup;
use crate::output::print_unmapped;
use anyhow::{Context as _, Result};
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::transform::{WorkspaceResponse, apply_overrides, workspace_to_entry};
use catalog_sync_common::types::StorageSystem;
use catalog_sync_common::upsert::UpsertMode;
use clap::Args;
use serde_json::{Value, json};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace namespace (defaults to WORKSPACE_NAMESPACE)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Workspace name (defaults to WORKSPACE_NAME)
    #[arg(long)]
    pub name: Option<String>,

    /// Read the Rawls workspace response from a file instead of Rawls
    #[arg(long)]
    pub workspace_file: Option<PathBuf>,

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

pub async fn run(ctx: &Context, args: &WorkspaceArgs) -> Result<()> {
    // Offline runs (file input plus --dry-run) never ask for credentials.
    let mut session = None;
    let workspace: WorkspaceResponse = match &args.workspace_file {
        Some(path) => read_json_file(path)?,
        None => {
            let (namespace, name) = workspace_coordinates(ctx, args)?;
            let session = session.insert(ctx.session().await?);
            ctx.rawls(session)?
                .get_workspace(&namespace, &name)
                .await
                .with_context(|| format!("fetching workspace {namespace}/{name}"))?
        }
    };

    let (mut entry, report) = workspace_to_entry(&workspace, &ctx.config.terra_ui_url.value);
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
    let workspace_id = &workspace.workspace.workspace_id;
    let lookup = match &args.dataset_id {
        Some(id) => ExistingLookup::DatasetId(id),
        None => ExistingLookup::FetchListing,
    };
    let outcome = ctx
        .catalog(&session)?
        .upsert(
            StorageSystem::Workspace,
            workspace_id,
            &entry,
            lookup,
            UpsertMode::CreateOrUpdate,
        )
        .await
        .with_context(|| format!("syncing workspace {workspace_id} to the catalog"))?;

    if ctx.format.is_json() {
        ctx.format.print(&json!({
            "outcome": outcome,
            "storageSourceId": workspace_id,
            "unmapped": report.unmapped,
        }))?;
    } else {
        println!("Catalog dataset {outcome} for workspace {workspace_id}");
    }
    Ok(())
}

/// Namespace and name from the flags or `WORKSPACE_NAMESPACE` / `WORKSPACE_NAME`.
fn workspace_coordinates(ctx: &Context, args: &WorkspaceArgs) -> Result<(String, String)> {
    let namespace = args
        .namespace
        .clone()
        .or_else(|| ctx.config.workspace_namespace.value.clone())
        .ok_or(SyncError::MissingValue {
            name: "workspace namespace",
            hint: "pass --namespace or set WORKSPACE_NAMESPACE",
        })?;
    let name = args
        .name
        .clone()
        .or_else(|| ctx.config.workspace_name.value.clone())
        .ok_or(SyncError::MissingValue {
            name: "workspace name",
            hint: "pass --name or set WORKSPACE_NAME",
        })?;
    Ok((namespace, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use mockito::Matcher;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/workspace.json")
    }

    fn workspace_args() -> WorkspaceArgs {
        WorkspaceArgs {
            namespace: None,
            name: None,
            workspace_file: None,
            dataset_id: None,
            overrides: None,
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_fetched_workspace_is_created() {
        let mut server = mockito::Server::new_async().await;
        let body = std::fs::read_to_string(fixture()).unwrap();
        let rawls = server
            .mock("GET", "/api/workspaces/broad-catalog/heart_atlas")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/api/v1/datasets")
            .with_status(200)
            .with_body(r#"{"result":[{"id":"c-other","dct:identifier":"other-ws"}]}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/datasets")
            .match_body(Matcher::PartialJson(json!({
                "storageSystem": "wks",
                "storageSourceId": "8e1a7c2d-ws"
            })))
            .with_status(200)
            .with_body(r#"{"id":"c-new"}"#)
            .create_async()
            .await;

        let (ctx, _dir) = test_context(
            &server.url(),
            &[
                ("WORKSPACE_NAMESPACE", "broad-catalog"),
                ("WORKSPACE_NAME", "heart_atlas"),
            ],
        );
        run(&ctx, &workspace_args()).await.unwrap();

        rawls.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_listed_workspace_is_updated() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v1/datasets")
            .with_status(200)
            .with_body(r#"{"result":[{"id":"c-7","dct:identifier":"8e1a7c2d-ws"}]}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/v1/datasets/c-7")
            .match_body(Matcher::PartialJson(json!({
                "dct:identifier": "8e1a7c2d-ws",
                "dct:title": "Heart Atlas"
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
        let args = WorkspaceArgs {
            workspace_file: Some(fixture()),
            ..workspace_args()
        };
        run(&ctx, &args).await.unwrap();

        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_explicit_dataset_id_is_checked_then_updated() {
        let mut server = mockito::Server::new_async().await;
        let lookup = server
            .mock("GET", "/api/v1/datasets/c-42")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let listing = server
            .mock("GET", "/api/v1/datasets")
            .expect(0)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/v1/datasets/c-42")
            .with_status(204)
            .create_async()
            .await;

        let (ctx, _dir) = test_context(&server.url(), &[]);
        let args = WorkspaceArgs {
            workspace_file: Some(fixture()),
            dataset_id: Some("c-42".to_string()),
            ..workspace_args()
        };
        run(&ctx, &args).await.unwrap();

        lookup.assert_async().await;
        listing.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_coordinates() {
        let server = mockito::Server::new_async().await;
        let (ctx, _dir) = test_context(&server.url(), &[("WORKSPACE_NAMESPACE", "ns")]);
        let err = run(&ctx, &workspace_args()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::MissingValue {
                name: "workspace name",
                ..
            })
        ));
    }
}
