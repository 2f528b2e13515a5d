//! Errors for the catalog sync tool.
//!
//! [`SyncError`] is what library code returns; each variant maps onto a code
//! in the [`catalog`] so the CLI can print remediation steps.

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};

use crate::config::EnvError;
use crate::types::Service;
use crate::validate::ValidationIssue;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while configuring, fetching, converting or publishing.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid environment: {}", join_env_errors(.0))]
    Env(Vec<EnvError>),

    #[error("missing {name}: {hint}")]
    MissingValue { name: &'static str, hint: &'static str },

    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{context} must be a JSON object, found {found}")]
    NotAnObject { context: String, found: &'static str },

    #[error("could not run {program}: {source}")]
    GcloudUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gcloud {action} failed: {message}")]
    Gcloud { action: String, message: String },

    #[error("access token from {origin} is empty")]
    EmptyToken { origin: &'static str },

    #[error("{service} {method} {url} failed: {message}")]
    Transport {
        service: Service,
        method: String,
        url: String,
        message: String,
    },

    #[error("{service} {method} {url} returned {status}: {message}")]
    Status {
        service: Service,
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {service} {url}: {message}")]
    InvalidResponse {
        service: Service,
        url: String,
        message: String,
    },

    #[error("{failed} of {total} items failed")]
    BatchIncomplete { failed: usize, total: usize },

    #[error("catalog entry failed validation ({} issue(s)): {}", .issues.len(), summarize_issues(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("missing field '{field}' in {context}")]
    MissingField { field: &'static str, context: String },

    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl SyncError {
    /// Error catalog code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::InputFileRead,
            Self::Json { .. } => ErrorCode::InputFileParse,
            Self::ConfigFile { .. } => ErrorCode::ConfigFileParse,
            Self::Env(_) => ErrorCode::ConfigEnvInvalid,
            Self::MissingValue { .. } => ErrorCode::ConfigMissingValue,
            Self::UnknownValue { .. } => ErrorCode::ConfigUnknownValue,
            Self::NotAnObject { .. } => ErrorCode::InputNotAnObject,
            Self::GcloudUnavailable { .. } => ErrorCode::AuthGcloudMissing,
            Self::Gcloud { .. } => ErrorCode::AuthGcloudFailed,
            Self::EmptyToken { .. } => ErrorCode::AuthTokenEmpty,
            Self::Transport { .. } => ErrorCode::RemoteTransport,
            Self::Status { status, .. } => match status {
                401 => ErrorCode::RemoteUnauthorized,
                403 => ErrorCode::RemoteForbidden,
                404 => ErrorCode::RemoteNotFound,
                500..=599 => ErrorCode::RemoteServerError,
                _ => ErrorCode::RemoteUnexpectedStatus,
            },
            Self::InvalidResponse { .. } => ErrorCode::RemoteInvalidResponse,
            Self::BatchIncomplete { .. } => ErrorCode::RemoteBatchIncomplete,
            Self::Validation { .. } => ErrorCode::MetadataInvalid,
            Self::MissingField { .. } => ErrorCode::MetadataMissingField,
            Self::Serialize(_) => ErrorCode::InternalSerde,
            Self::Logging(_) => ErrorCode::InternalLogging,
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn join_env_errors(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
