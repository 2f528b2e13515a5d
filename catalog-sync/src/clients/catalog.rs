//! Catalog service `/api/v1/datasets`.

use crate::http::ApiClient;
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::{
    CatalogEntry, CreateDatasetRequest, CreatedDatasetId, DatasetsListResponse, StorageSystem,
};
use catalog_sync_common::upsert::{
    UpsertAction, UpsertMode, UpsertOutcome, existence_from_probe, plan_upsert,
};
use serde_json::Value;
use tracing::{debug, info};

const DATASETS_PATH: &str = "/api/v1/datasets";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

/// Where to look for an existing dataset during an upsert.
#[derive(Debug, Clone, Copy)]
pub enum ExistingLookup<'a> {
    /// Probe this catalog id directly.
    DatasetId(&'a str),
    /// Search a listing already fetched for the entry's `dct:identifier`.
    Listing(&'a DatasetsListResponse),
    /// Fetch the listing and search it.
    FetchListing,
}

impl CatalogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn dataset_path(id: &str) -> String {
        format!("{DATASETS_PATH}/{}", urlencoding::encode(id))
    }

    /// Full URL of one dataset, id percent-encoded.
    pub fn dataset_url(&self, id: &str) -> String {
        self.api.url(&Self::dataset_path(id))
    }

    pub async fn list_datasets(&self) -> Result<DatasetsListResponse, SyncError> {
        let listing: DatasetsListResponse = self
            .api
            .get(DATASETS_PATH)
            .await?
            .error_for_status()?
            .json()?;
        debug!(count = listing.result.len(), "listed catalog datasets");
        Ok(listing)
    }

    /// The stored entry, or `None` when the id is unknown.
    pub async fn get_dataset(&self, id: &str) -> Result<Option<CatalogEntry>, SyncError> {
        let response = self.api.get(&Self::dataset_path(id)).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let value: Value = response.error_for_status()?.json()?;
        CatalogEntry::from_value(value).map(Some)
    }

    /// Status of `GET /api/v1/datasets/{id}`, whatever it is.
    pub async fn probe_dataset(&self, id: &str) -> Result<u16, SyncError> {
        Ok(self.api.get(&Self::dataset_path(id)).await?.status)
    }

    pub async fn create_dataset(
        &self,
        request: &CreateDatasetRequest,
    ) -> Result<CreatedDatasetId, SyncError> {
        let body = serde_json::to_value(request).map_err(SyncError::Serialize)?;
        let created: CreatedDatasetId = self
            .api
            .post(DATASETS_PATH, &body)
            .await?
            .error_for_status()?
            .json()?;
        info!(
            id = %created.id,
            storage_system = %request.storage_system,
            storage_source_id = %request.storage_source_id,
            "created catalog dataset"
        );
        Ok(created)
    }

    /// Replace the stored entry. The body is the entry itself.
    pub async fn update_dataset(&self, id: &str, entry: &CatalogEntry) -> Result<(), SyncError> {
        self.update_dataset_raw(id, &entry.clone().into_value())
            .await?
            .error_for_status()?;
        info!(id, "updated catalog dataset");
        Ok(())
    }

    /// `PUT` without interpreting the status, for callers that report
    /// failures themselves.
    pub async fn update_dataset_raw(
        &self,
        id: &str,
        body: &Value,
    ) -> Result<crate::http::ApiResponse, SyncError> {
        self.api.put(&Self::dataset_path(id), body).await
    }

    /// Catalog id of the dataset that already holds this entry, if any.
    pub async fn find_existing(
        &self,
        storage_source_id: &str,
        lookup: ExistingLookup<'_>,
    ) -> Result<Option<String>, SyncError> {
        match lookup {
            ExistingLookup::DatasetId(id) => {
                let status = self.probe_dataset(id).await?;
                let exists = existence_from_probe(status, &self.dataset_url(id))?;
                Ok(exists.then(|| id.to_string()))
            }
            ExistingLookup::Listing(listing) => Ok(listing
                .find_by_identifier(storage_source_id)
                .map(|dataset| dataset.id.clone())),
            ExistingLookup::FetchListing => {
                let listing = self.list_datasets().await?;
                Ok(listing
                    .find_by_identifier(storage_source_id)
                    .map(|dataset| dataset.id.clone()))
            }
        }
    }

    /// Create the dataset, or update or skip it when it already exists.
    pub async fn upsert(
        &self,
        storage_system: StorageSystem,
        storage_source_id: &str,
        entry: &CatalogEntry,
        lookup: ExistingLookup<'_>,
        mode: UpsertMode,
    ) -> Result<UpsertOutcome, SyncError> {
        let existing = self.find_existing(storage_source_id, lookup).await?;
        let action = plan_upsert(existing.as_deref(), mode);
        info!(storage_source_id, %action, "upserting catalog dataset");

        match action {
            UpsertAction::Create => {
                let request = CreateDatasetRequest::new(storage_system, storage_source_id, entry)?;
                let created = self.create_dataset(&request).await?;
                Ok(UpsertOutcome::Created(created.id))
            }
            UpsertAction::Update { id } => {
                self.update_dataset(&id, entry).await?;
                Ok(UpsertOutcome::Updated(id))
            }
            UpsertAction::Skip { id } => Ok(UpsertOutcome::Skipped(id)),
        }
    }
}
