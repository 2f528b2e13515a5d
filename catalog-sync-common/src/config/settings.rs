//! Resolved configuration for one CLI invocation.
//!
//! Precedence is command line, then environment, then config file, then the
//! built-in default. Every value keeps the source it was taken from so
//! `config show` can explain where it came from.

use super::env::EnvParser;
use super::file::{CONFIG_PATH_ENV, FileConfig};
use super::source::{ConfigSource, Sourced};
use crate::errors::SyncError;
use crate::types::Environment;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Accepted range for the HTTP timeout.
pub const TIMEOUT_RANGE: (u64, u64) = (1, 600);

/// A value that must never be printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub environment: Option<Environment>,
    pub user: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SyncConfig {
    pub environment: Sourced<Environment>,
    pub catalog_url: Sourced<String>,
    pub rawls_url: Sourced<String>,
    pub datarepo_url: Sourced<String>,
    pub terra_ui_url: Sourced<String>,
    /// Account to run gcloud as; `None` keeps the active account.
    pub gcloud_user: Sourced<Option<String>>,
    pub gcloud_bin: Sourced<String>,
    /// Pre-issued bearer token that bypasses gcloud.
    pub auth_token: Sourced<Option<Secret>>,
    pub steward_email: Sourced<Option<String>>,
    pub timeout_secs: Sourced<u64>,
    pub workspace_namespace: Sourced<Option<String>>,
    pub workspace_name: Sourced<Option<String>>,
    /// Config file that was read, if any.
    pub config_file: Option<PathBuf>,
}

/// One line of `config show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRow {
    pub key: &'static str,
    pub value: String,
    pub source: ConfigSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

impl SyncConfig {
    /// Resolve configuration from the process environment.
    pub fn resolve(cli: &CliOverrides) -> Result<Self, SyncError> {
        Self::resolve_with(cli, &mut EnvParser::new())
    }

    /// Resolve configuration with an explicit environment parser.
    pub fn resolve_with(cli: &CliOverrides, env: &mut EnvParser) -> Result<Self, SyncError> {
        let env_config_path = env.get_optional_path(CONFIG_PATH_ENV).value;
        let (file, config_file) =
            load_file(cli.config_path.as_deref().or(env_config_path.as_deref()))?;

        let env_environment = env.get_parsed::<Environment>(
            "CATALOG_ENVIRONMENT",
            "one of prod, dev, alpha, staging, perf",
        );
        let file_environment = match &file.environment {
            Some(name) => Sourced::from_file(Some(name.parse::<Environment>()?)),
            None => Sourced::default_value(None),
        };
        let environment = Sourced::from_cli(cli.environment)
            .or(env_environment)
            .or(file_environment)
            .unwrap_or_else(Environment::default);
        let target = environment.value;

        let catalog_url = resolve_url(env, "CATALOG_SERVICE_URL", &file.urls.catalog, || {
            target.catalog_url()
        });
        let rawls_url = resolve_url(env, "RAWLS_URL", &file.urls.rawls, || target.rawls_url());
        let datarepo_url = resolve_url(env, "DATA_REPO_URL", &file.urls.datarepo, || {
            target.datarepo_url()
        });
        let terra_ui_url = resolve_url(env, "TERRA_UI_URL", &file.urls.terra_ui, || {
            target.terra_ui_url()
        });

        let gcloud_user = Sourced::from_cli(cli.user.clone())
            .or(env.get_optional_string("GCLOUD_USER"))
            .or(Sourced::from_file(file.user.clone()));
        let gcloud_bin = env.get_string("GCLOUD_BIN", "gcloud");
        let auth_token = env.get_optional_string("AUTH_TOKEN").map(|t| t.map(Secret::new));
        let steward_email = env
            .get_optional_string("USER_EMAIL")
            .or(Sourced::from_file(file.steward_email.clone()));

        let (min, max) = TIMEOUT_RANGE;
        let file_timeout = match file.timeout_secs {
            Some(secs) if secs < min || secs > max => {
                return Err(SyncError::UnknownValue {
                    kind: "timeout_secs",
                    value: secs.to_string(),
                    expected: "1..=600",
                });
            }
            other => Sourced::from_file(other),
        };
        let timeout_secs = env
            .get_u64_range("CATALOG_SYNC_TIMEOUT_SECS", min, max)
            .or(file_timeout)
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS);

        let workspace_namespace = env.get_optional_string("WORKSPACE_NAMESPACE");
        let workspace_name = env.get_optional_string("WORKSPACE_NAME");

        if env.has_errors() {
            return Err(SyncError::Env(env.take_errors()));
        }

        Ok(Self {
            environment,
            catalog_url,
            rawls_url,
            datarepo_url,
            terra_ui_url,
            gcloud_user,
            gcloud_bin,
            auth_token,
            steward_email,
            timeout_secs,
            workspace_namespace,
            workspace_name,
            config_file,
        })
    }

    /// Rows for `config show`, token redacted.
    pub fn rows(&self) -> Vec<ConfigRow> {
        fn row<T: fmt::Display>(key: &'static str, sourced: &Sourced<T>) -> ConfigRow {
            ConfigRow {
                key,
                value: sourced.value.to_string(),
                source: sourced.source,
                env_var: sourced.env_var.clone(),
            }
        }
        fn opt_row<T: fmt::Display>(key: &'static str, sourced: &Sourced<Option<T>>) -> ConfigRow {
            ConfigRow {
                key,
                value: sourced
                    .value
                    .as_ref()
                    .map_or_else(|| "(unset)".to_string(), ToString::to_string),
                source: sourced.source,
                env_var: sourced.env_var.clone(),
            }
        }

        vec![
            row("environment", &self.environment),
            row("catalog_url", &self.catalog_url),
            row("rawls_url", &self.rawls_url),
            row("datarepo_url", &self.datarepo_url),
            row("terra_ui_url", &self.terra_ui_url),
            opt_row("gcloud_user", &self.gcloud_user),
            row("gcloud_bin", &self.gcloud_bin),
            opt_row("auth_token", &self.auth_token),
            opt_row("steward_email", &self.steward_email),
            row("timeout_secs", &self.timeout_secs),
            opt_row("workspace_namespace", &self.workspace_namespace),
            opt_row("workspace_name", &self.workspace_name),
        ]
    }
}

fn load_file(explicit: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), SyncError> {
    match explicit {
        // An explicitly named file must exist.
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok((FileConfig::parse(&contents, path)?, Some(path.to_path_buf())))
        }
        None => match FileConfig::default_path() {
            Some(path) if path.exists() => Ok((FileConfig::load(&path)?, Some(path))),
            _ => Ok((FileConfig::default(), None)),
        },
    }
}

fn resolve_url(
    env: &mut EnvParser,
    var: &str,
    file_value: &Option<String>,
    default: impl FnOnce() -> String,
) -> Sourced<String> {
    env.get_optional_string(var)
        .or(Sourced::from_file(file_value.clone()))
        .unwrap_or_else(default)
        .map(|url| url.trim_end_matches('/').to_string())
}
