//! Optional TOML config file.
//!
//! ```toml
//! environment = "staging"
//! user = "operator@firecloud.org"
//! steward_email = "operator@firecloud.org"
//! timeout_secs = 60
//!
//! [urls]
//! catalog = "http://localhost:8080"
//! ```

use crate::errors::SyncError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CATALOG_SYNC_CONFIG";

/// Service URL overrides from the `[urls]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlOverrides {
    pub catalog: Option<String>,
    pub rawls: Option<String>,
    pub datarepo: Option<String>,
    pub terra_ui: Option<String>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub environment: Option<String>,
    pub user: Option<String>,
    pub steward_email: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub urls: UrlOverrides,
}

impl FileConfig {
    /// Default location: `<config_dir>/catalog-sync/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalog-sync").join("config.toml"))
    }

    /// Parse config text. `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, SyncError> {
        toml::from_str(contents).map_err(|source| SyncError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file at `path`. A missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Self::parse(&contents, path)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SyncError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = FileConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
environment = "alpha"
user = "op@firecloud.org"
timeout_secs = 90

[urls]
catalog = "http://localhost:8080"
terra_ui = "http://localhost:3000"
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.environment.as_deref(), Some("alpha"));
        assert_eq!(config.user.as_deref(), Some("op@firecloud.org"));
        assert_eq!(config.timeout_secs, Some(90));
        assert_eq!(config.urls.catalog.as_deref(), Some("http://localhost:8080"));
        assert!(config.urls.rawls.is_none());
        assert!(config.steward_email.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = FileConfig::parse("enviroment = \"dev\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, SyncError::ConfigFile { .. }));
        assert!(err.to_string().contains("c.toml"));
    }
}
