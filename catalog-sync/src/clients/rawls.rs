//! Rawls workspace lookups.

use crate::http::ApiClient;
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::transform::WorkspaceResponse;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RawlsClient {
    api: ApiClient,
}

impl RawlsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/workspaces/{namespace}/{name}`.
    pub async fn get_workspace(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<WorkspaceResponse, SyncError> {
        info!(namespace, name, "fetching workspace from rawls");
        let path = format!(
            "/api/workspaces/{}/{}",
            urlencoding::encode(namespace),
            urlencoding::encode(name)
        );
        self.api.get(&path).await?.error_for_status()?.json()
    }
}
