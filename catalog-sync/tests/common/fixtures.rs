use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// An isolated home for one binary invocation: an empty environment and a
/// config file of the test's choosing.
pub struct TestEnv {
    pub dir: TempDir,
    pub config_path: PathBuf,
    vars: Vec<(String, String)>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config("")
    }

    pub fn with_config(contents: &str) -> Self {
        crate::test_log!("FIXTURE: Creating isolated catalog-sync environment");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, contents).expect("Failed to write config.toml");

        Self {
            dir,
            config_path,
            vars: Vec::new(),
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.vars.push((key.to_string(), value.to_string()));
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-sync"));
        cmd.env_clear()
            .env("HOME", self.dir.path())
            .env("CATALOG_SYNC_CONFIG", &self.config_path)
            .env("CATALOG_SYNC_LOG_LEVEL", "warn");
        for (key, value) in &self.vars {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        crate::test_log!("RUN: catalog-sync {}", args.join(" "));
        self.command()
            .args(args)
            .output()
            .expect("Failed to run catalog-sync")
    }
}
