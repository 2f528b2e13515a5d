//! Clients for the three services the tool talks to.

pub mod catalog;
pub mod datarepo;
pub mod rawls;

pub use catalog::CatalogClient;
pub use datarepo::DataRepoClient;
pub use rawls::RawlsClient;

use crate::auth::AccessToken;
use crate::http::ApiClient;
use catalog_sync_common::SyncConfig;
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::Service;
use std::time::Duration;

/// Build the client for one service from the resolved configuration.
pub fn api_client(
    config: &SyncConfig,
    service: Service,
    token: &AccessToken,
) -> Result<ApiClient, SyncError> {
    let base_url = match service {
        Service::Catalog => &config.catalog_url.value,
        Service::Rawls => &config.rawls_url.value,
        Service::DataRepo => &config.datarepo_url.value,
    };
    ApiClient::new(
        service,
        base_url,
        token.clone(),
        Duration::from_secs(config.timeout_secs.value),
    )
}
