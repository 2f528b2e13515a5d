//! Shared building blocks for the catalog sync tool.
//!
//! The binary crate does the I/O (gcloud, HTTP); everything here is pure:
//! configuration resolution, the error catalog, the lookup tables that turn
//! free-text workspace and snapshot labels into catalog vocabulary, and the
//! transforms that produce catalog entries.

#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod logging;
pub mod mapping;
pub mod testing;
pub mod transform;
pub mod types;
pub mod upsert;
pub mod validate;

pub use config::{CliOverrides, ConfigSource, EnvParser, FileConfig, Secret, Sourced, SyncConfig};
pub use errors::{ErrorCategory, ErrorCode, ErrorEntry, SyncError};
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use mapping::{MappingReport, UnmappedValue};
pub use types::{
    CatalogDataset, CatalogEntry, CreateDatasetRequest, CreatedDatasetId, DatasetsListResponse,
    Environment, Service, StorageSystem,
};
pub use upsert::{UpsertAction, UpsertMode, UpsertOutcome, existence_from_probe, plan_upsert};
pub use validate::{ValidationIssue, validate_entry};
