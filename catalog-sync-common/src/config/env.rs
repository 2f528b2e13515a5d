//! Environment variable parsing with type safety.
//!
//! The operator scripts were configured entirely through environment
//! variables (`RAWLS_URL`, `GCLOUD_USER`, `AUTH_TOKEN`, ...). The parser reads
//! them with validation, collects every error so all problems are reported
//! at once, and records the variable each value came from.

use super::source::Sourced;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Value out of valid range.
    #[error("Value out of range for {var}: {value} (valid: {min}..={max})")]
    OutOfRange {
        var: String,
        value: String,
        min: String,
        max: String,
    },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Where variables are read from.
enum Lookup {
    Process,
    Map(HashMap<String, String>),
}

/// Type-safe environment variable parser.
///
/// Collects errors during parsing so all issues can be reported at once.
pub struct EnvParser {
    lookup: Lookup,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a parser over the process environment.
    pub fn new() -> Self {
        Self {
            lookup: Lookup::Process,
            errors: Vec::new(),
        }
    }

    /// Create a parser over a fixed set of variables.
    pub fn from_map<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            lookup: Lookup::Map(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            errors: Vec::new(),
        }
    }

    /// Get all accumulated errors.
    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take ownership of errors.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.lookup {
            Lookup::Process => env::var(name).ok(),
            Lookup::Map(vars) => vars.get(name).cloned(),
        }
    }

    /// Get a string value with default.
    pub fn get_string(&mut self, name: &str, default: &str) -> Sourced<String> {
        match self.var(name) {
            Some(value) => Sourced::from_env(value, name),
            None => Sourced::default_value(default.to_string()),
        }
    }

    /// Get an optional string (None if not set or blank).
    pub fn get_optional_string(&mut self, name: &str) -> Sourced<Option<String>> {
        match self.var(name) {
            Some(value) if value.trim().is_empty() => Sourced::from_env(None, name),
            Some(value) => Sourced::from_env(Some(value.trim().to_string()), name),
            None => Sourced::default_value(None),
        }
    }

    /// Get an optional value parsed through `FromStr`.
    ///
    /// `expected` describes the accepted values for the error message.
    pub fn get_parsed<T: FromStr>(&mut self, name: &str, expected: &str) -> Sourced<Option<T>> {
        match self.var(name) {
            Some(value) if value.trim().is_empty() => Sourced::default_value(None),
            Some(value) => match value.trim().parse::<T>() {
                Ok(parsed) => Sourced::from_env(Some(parsed), name),
                Err(_) => {
                    self.errors.push(EnvError::InvalidValue {
                        var: name.to_string(),
                        expected: expected.to_string(),
                        value,
                    });
                    Sourced::default_value(None)
                }
            },
            None => Sourced::default_value(None),
        }
    }

    /// Get an optional u64 with range validation.
    pub fn get_u64_range(&mut self, name: &str, min: u64, max: u64) -> Sourced<Option<u64>> {
        match self.var(name) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(n) if n >= min && n <= max => Sourced::from_env(Some(n), name),
                Ok(n) => {
                    self.errors.push(EnvError::OutOfRange {
                        var: name.to_string(),
                        value: n.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                    Sourced::default_value(None)
                }
                Err(_) => {
                    self.errors.push(EnvError::InvalidValue {
                        var: name.to_string(),
                        expected: "unsigned 64-bit integer".to_string(),
                        value,
                    });
                    Sourced::default_value(None)
                }
            },
            None => Sourced::default_value(None),
        }
    }

    /// Get an optional path with ~ expansion.
    pub fn get_optional_path(&mut self, name: &str) -> Sourced<Option<PathBuf>> {
        match self.var(name) {
            Some(value) if value.trim().is_empty() => Sourced::from_env(None, name),
            Some(value) => Sourced::from_env(Some(expand_home(value.trim())), name),
            None => Sourced::default_value(None),
        }
    }

    /// Get a log level value with validation.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        match self.var(name) {
            Some(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: name.to_string(),
                            value: value.clone(),
                        });
                        Sourced::from_env(default.to_string(), name)
                    }
                }
            }
            None => Sourced::default_value(default.to_string()),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_home(value: &str) -> PathBuf {
    if let Some(stripped) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(value)
}
