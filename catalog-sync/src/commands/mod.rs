//! Subcommand implementations.

pub mod config_cmd;
pub mod datasets;
pub mod helpers;
pub mod ingest;
pub mod publish;
pub mod refresh;
pub mod snapshot;
pub mod validate;
pub mod workspace;

use crate::auth::Session;
use crate::clients::{CatalogClient, DataRepoClient, RawlsClient, api_client};
use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use catalog_sync_common::SyncConfig;
use catalog_sync_common::types::Service;

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    pub config: SyncConfig,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: SyncConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }

    /// Obtain credentials. Holds any gcloud account switch until dropped.
    pub async fn session(&self) -> Result<Session> {
        Session::open(&self.config)
            .await
            .context("obtaining an access token")
    }

    pub fn catalog(&self, session: &Session) -> Result<CatalogClient> {
        Ok(CatalogClient::new(api_client(
            &self.config,
            Service::Catalog,
            &session.token,
        )?))
    }

    pub fn rawls(&self, session: &Session) -> Result<RawlsClient> {
        Ok(RawlsClient::new(api_client(
            &self.config,
            Service::Rawls,
            &session.token,
        )?))
    }

    pub fn datarepo(&self, session: &Session) -> Result<DataRepoClient> {
        Ok(DataRepoClient::new(api_client(
            &self.config,
            Service::DataRepo,
            &session.token,
        )?))
    }
}

/// A context whose three services all point at `url`, authenticated with a
/// static token. Keep the returned directory alive for the test's duration.
#[cfg(test)]
pub(crate) fn test_context(
    url: &str,
    extra_env: &[(&str, &str)],
) -> (Context, tempfile::TempDir) {
    use catalog_sync_common::config::{CliOverrides, EnvParser};

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "").unwrap();

    let mut vars = vec![("AUTH_TOKEN", "test-token")];
    for var in ["CATALOG_SERVICE_URL", "RAWLS_URL", "DATA_REPO_URL", "TERRA_UI_URL"] {
        vars.push((var, url));
    }
    vars.extend_from_slice(extra_env);

    let cli = CliOverrides {
        config_path: Some(config_path),
        ..Default::default()
    };
    let config = SyncConfig::resolve_with(&cli, &mut EnvParser::from_map(vars)).unwrap();
    (Context::new(config, OutputFormat::Json), dir)
}
