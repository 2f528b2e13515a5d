//! Logging setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for command output (catalog
//! entries, listings, created ids). An optional JSON file copy is written
//! through a non-blocking appender.

use crate::config::EnvParser;
use crate::errors::SyncError;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const LOG_LEVEL_ENV: &str = "CATALOG_SYNC_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "CATALOG_SYNC_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "CATALOG_SYNC_LOG_FILE";

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Also write JSON lines to this file.
    pub file: Option<PathBuf>,
    pub stderr: bool,
}

impl LogConfig {
    /// Read logging settings from the process environment.
    ///
    /// Invalid values fall back to the defaults; logging is not yet set up
    /// at this point so there is nowhere to report them.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_parser(&mut EnvParser::new(), default_level)
    }

    pub fn from_parser(env: &mut EnvParser, default_level: &str) -> Self {
        let level = env.get_log_level(LOG_LEVEL_ENV, default_level).value;
        let format = env
            .get_parsed::<LogFormat>(LOG_FORMAT_ENV, "pretty, compact or json")
            .value
            .unwrap_or_default();
        let file = env.get_optional_path(LOG_FILE_ENV).value;
        Self {
            level,
            format,
            file,
            stderr: false,
        }
    }

    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Filter directives: the level for this tool, HTTP internals kept quiet.
    fn directives(&self) -> String {
        format!("{},hyper_util=warn,reqwest=warn", self.level)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
            stderr: true,
        }
    }
}

/// Keeps the file writer flushing until the process exits.
#[must_use = "dropping the guards stops file logging"]
pub struct LoggingGuards {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber. `RUST_LOG`, when set, wins over `config.level`.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards, SyncError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())
            .map_err(|e| SyncError::Logging(format!("invalid log level: {e}")))?,
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];

    let file_guard = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| SyncError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| SyncError::Io {
                    path: path.clone(),
                    source,
                })?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_current_span(true)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| SyncError::Logging(e.to_string()))?;

    Ok(LoggingGuards { _file: file_guard })
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    if config.stderr {
        let ansi = std::io::stderr().is_terminal();
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi);
        match config.format {
            LogFormat::Pretty => layer.with_target(false).boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    } else {
        let layer = tracing_subscriber::fmt::layer();
        match config.format {
            LogFormat::Pretty => layer.with_target(false).boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}
