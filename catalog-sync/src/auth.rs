//! Bearer tokens for the Terra services.
//!
//! A token comes either from `AUTH_TOKEN` or from the gcloud CLI. When a
//! specific account is requested, gcloud is switched to it for the duration
//! of the command and switched back afterwards.

use catalog_sync_common::SyncConfig;
use catalog_sync_common::config::Secret;
use catalog_sync_common::errors::SyncError;
use std::fmt;
use std::future::Future;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// An OAuth access token. Formatting never reveals it.
#[derive(Clone)]
pub struct AccessToken(Secret);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token))
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.expose())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer ***")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer ***")
    }
}

/// Something that can hand out an access token.
pub trait TokenSource {
    fn access_token(&self) -> impl Future<Output = Result<AccessToken, SyncError>> + Send;
}

/// A token supplied up front, e.g. through `AUTH_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    /// Accepts `Authorization: Bearer X`, `Bearer X` or a bare `X`.
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        let mut token = raw.trim();
        if let Some(rest) = strip_prefix_ignore_case(token, "authorization:") {
            token = rest.trim_start();
        }
        if let Some(rest) = strip_prefix_ignore_case(token, "bearer")
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            token = rest.trim_start();
        }
        if token.is_empty() {
            return Err(SyncError::EmptyToken { origin: "AUTH_TOKEN" });
        }
        Ok(Self(AccessToken::new(token)))
    }
}

impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<AccessToken, SyncError> {
        Ok(self.0.clone())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// The gcloud CLI.
#[derive(Debug, Clone)]
pub struct Gcloud {
    program: String,
}

impl Gcloud {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str], action: &str) -> Result<String, SyncError> {
        debug!(program = %self.program, ?args, "running gcloud");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| SyncError::GcloudUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SyncError::Gcloud {
                action: action.to_string(),
                message: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Active account, `None` when gcloud has none set.
    pub async fn current_account(&self) -> Result<Option<String>, SyncError> {
        let account = self
            .run(&["config", "get-value", "account"], "config get-value account")
            .await?;
        Ok(match account.as_str() {
            "" | "(unset)" => None,
            _ => Some(account),
        })
    }

    pub async fn login(&self, user: &str) -> Result<(), SyncError> {
        info!(user, "switching gcloud account");
        self.run(&["auth", "login", user, "--brief"], "auth login")
            .await
            .map(|_| ())
    }

    pub async fn print_access_token(&self) -> Result<AccessToken, SyncError> {
        let token = self
            .run(&["auth", "print-access-token"], "auth print-access-token")
            .await?;
        if token.is_empty() {
            return Err(SyncError::EmptyToken { origin: "gcloud" });
        }
        Ok(AccessToken::new(token))
    }

    fn login_blocking(&self, user: &str) -> std::io::Result<std::process::ExitStatus> {
        std::process::Command::new(&self.program)
            .args(["auth", "login", user, "--brief"])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
    }
}

impl TokenSource for Gcloud {
    async fn access_token(&self) -> Result<AccessToken, SyncError> {
        self.print_access_token().await
    }
}

/// Runs the command as another gcloud account, restoring the original on drop.
#[derive(Debug)]
pub struct AccountSwitch {
    gcloud: Gcloud,
    restore_to: Option<String>,
}

impl AccountSwitch {
    /// Switch to `requested` unless it is already active.
    pub async fn activate(gcloud: &Gcloud, requested: Option<&str>) -> Result<Self, SyncError> {
        let mut switch = Self {
            gcloud: gcloud.clone(),
            restore_to: None,
        };
        let Some(requested) = requested else {
            return Ok(switch);
        };

        let original = gcloud.current_account().await?;
        if original.as_deref() == Some(requested) {
            debug!(user = requested, "gcloud account already active");
            return Ok(switch);
        }

        gcloud.login(requested).await?;
        switch.restore_to = original;
        Ok(switch)
    }
}

impl Drop for AccountSwitch {
    fn drop(&mut self) {
        let Some(original) = self.restore_to.take() else {
            return;
        };
        info!(user = %original, "restoring gcloud account");
        match self.gcloud.login_blocking(&original) {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(user = %original, %status, "failed to restore gcloud account"),
            Err(e) => warn!(user = %original, error = %e, "failed to restore gcloud account"),
        }
    }
}

/// Token plus whatever must stay alive while it is used.
#[derive(Debug)]
pub struct Session {
    pub token: AccessToken,
    _switch: Option<AccountSwitch>,
}

impl Session {
    /// Obtain a token according to the configuration.
    ///
    /// `AUTH_TOKEN` wins; otherwise gcloud is asked, as `gcloud_user` when set.
    pub async fn open(config: &SyncConfig) -> Result<Self, SyncError> {
        if let Some(raw) = &config.auth_token.value {
            debug!("using token from AUTH_TOKEN");
            let token = StaticToken::parse(raw.expose())?.access_token().await?;
            return Ok(Self {
                token,
                _switch: None,
            });
        }

        let gcloud = Gcloud::new(config.gcloud_bin.value.clone());
        let switch = AccountSwitch::activate(&gcloud, config.gcloud_user.value.as_deref()).await?;
        let token = gcloud.access_token().await?;
        Ok(Self {
            token,
            _switch: Some(switch),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_forms() {
        for raw in [
            "Authorization: Bearer abc.def",
            "authorization:bearer abc.def",
            "Bearer abc.def",
            "  abc.def  ",
        ] {
            let token = StaticToken::parse(raw).unwrap().access_token().await.unwrap();
            assert_eq!(token.header_value(), "Bearer abc.def", "form {raw:?}");
        }
    }

    #[test]
    fn test_static_token_empty() {
        for raw in ["", "   ", "Bearer ", "Authorization: Bearer"] {
            assert!(
                matches!(StaticToken::parse(raw), Err(SyncError::EmptyToken { .. })),
                "form {raw:?}"
            );
        }
    }

    #[test]
    fn test_token_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert_eq!(format!("{token:?}"), "Bearer ***");
        assert_eq!(token.to_string(), "Bearer ***");
    }

    #[tokio::test]
    #[serial_test::serial(gcloud)]
    async fn test_missing_gcloud_binary() {
        let gcloud = Gcloud::new("/nonexistent/catalog-sync/gcloud");
        let err = gcloud.print_access_token().await.unwrap_err();
        assert!(matches!(err, SyncError::GcloudUnavailable { .. }));
    }

    #[cfg(unix)]
    mod fake_gcloud {
        use super::*;
        use serial_test::serial;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        /// Write a gcloud stand-in that records its arguments.
        fn fake_gcloud(dir: &TempDir, active: &str, token: &str) -> (PathBuf, PathBuf) {
            let log = dir.path().join("calls.log");
            let script = dir.path().join("gcloud");
            let body = format!(
                "#!/bin/sh\n\
                 echo \"$@\" >> '{log}'\n\
                 case \"$1 $2\" in\n\
                 \"config get-value\") echo '{active}' ;;\n\
                 \"auth print-access-token\") echo '{token}' ;;\n\
                 \"auth login\") echo 'logged in' >&2 ;;\n\
                 *) echo \"unexpected: $@\" >&2; exit 2 ;;\n\
                 esac\n",
                log = log.display(),
            );
            std::fs::write(&script, body).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            (script, log)
        }

        fn calls(log: &Path) -> Vec<String> {
            std::fs::read_to_string(log)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[tokio::test]
        #[serial(gcloud)]
        async fn test_switch_and_restore() {
            let dir = TempDir::new().unwrap();
            let (script, log) = fake_gcloud(&dir, "original@x.org", "tok-123");
            let gcloud = Gcloud::new(script.to_string_lossy());

            {
                let switch = AccountSwitch::activate(&gcloud, Some("admin@x.org")).await.unwrap();
                assert_eq!(switch.restore_to.as_deref(), Some("original@x.org"));
                let token = gcloud.access_token().await.unwrap();
                assert_eq!(token.header_value(), "Bearer tok-123");
            }

            assert_eq!(
                calls(&log),
                vec![
                    "config get-value account",
                    "auth login admin@x.org --brief",
                    "auth print-access-token",
                    "auth login original@x.org --brief",
                ]
            );
        }

        #[tokio::test]
        #[serial(gcloud)]
        async fn test_no_switch_when_already_active() {
            let dir = TempDir::new().unwrap();
            let (script, log) = fake_gcloud(&dir, "admin@x.org", "tok");
            let gcloud = Gcloud::new(script.to_string_lossy());

            let switch = AccountSwitch::activate(&gcloud, Some("admin@x.org")).await.unwrap();
            assert!(switch.restore_to.as_deref().is_none());
            drop(switch);

            assert_eq!(calls(&log), vec!["config get-value account"]);
        }

        #[tokio::test]
        #[serial(gcloud)]
        async fn test_empty_token_is_an_error() {
            let dir = TempDir::new().unwrap();
            let (script, _) = fake_gcloud(&dir, "a@x.org", "");
            let gcloud = Gcloud::new(script.to_string_lossy());
            assert!(matches!(
                gcloud.print_access_token().await,
                Err(SyncError::EmptyToken { origin: "gcloud" })
            ));
        }

        #[tokio::test]
        #[serial(gcloud)]
        async fn test_failing_command_reports_stderr() {
            let dir = TempDir::new().unwrap();
            let script = dir.path().join("gcloud");
            std::fs::write(&script, "#!/bin/sh\necho 'Reauthentication required' >&2\nexit 1\n")
                .unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            let err = Gcloud::new(script.to_string_lossy())
                .print_access_token()
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Reauthentication required"));
        }
    }
}
