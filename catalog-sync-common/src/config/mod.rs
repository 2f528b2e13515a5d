//! Configuration for catalog sync.
//!
//! This module provides:
//! - Environment variable parsing with type safety
//! - An optional TOML config file
//! - Source tracking for `config show`

pub mod env;
pub mod file;
pub mod settings;
pub mod source;

pub use env::{EnvError, EnvParser};
pub use file::{CONFIG_PATH_ENV, FileConfig, UrlOverrides};
pub use settings::{CliOverrides, ConfigRow, DEFAULT_TIMEOUT_SECS, Secret, SyncConfig};
pub use source::{ConfigSource, Sourced};
