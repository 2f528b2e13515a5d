//! Terra Data Repo: snapshots and steward membership.

use crate::http::ApiClient;
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::transform::SnapshotModel;
use serde_json::json;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DataRepoClient {
    api: ApiClient,
}

impl DataRepoClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn snapshot_path(snapshot_id: &str) -> String {
        format!(
            "/api/repository/v1/snapshots/{}",
            urlencoding::encode(snapshot_id)
        )
    }

    fn steward_path(snapshot_id: &str) -> String {
        format!("{}/policies/steward/members", Self::snapshot_path(snapshot_id))
    }

    pub async fn get_snapshot(&self, snapshot_id: &str) -> Result<SnapshotModel, SyncError> {
        info!(snapshot_id, "fetching snapshot from data repo");
        self.api
            .get(&Self::snapshot_path(snapshot_id))
            .await?
            .error_for_status()?
            .json()
    }

    /// Add `email` to the snapshot's steward policy.
    pub async fn add_steward(&self, snapshot_id: &str, email: &str) -> Result<(), SyncError> {
        info!(snapshot_id, email, "adding snapshot steward");
        self.api
            .post(&Self::steward_path(snapshot_id), &json!({ "email": email }))
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// Remove `email` from the snapshot's steward policy.
    pub async fn remove_steward(&self, snapshot_id: &str, email: &str) -> Result<(), SyncError> {
        info!(snapshot_id, email, "removing snapshot steward");
        let path = format!(
            "{}/{}",
            Self::steward_path(snapshot_id),
            urlencoding::encode(email)
        );
        self.api
            .delete(&path)
            .await?
            .error_for_status()
            .map(|_| ())
    }
}
