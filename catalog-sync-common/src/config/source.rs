//! Source tracking for resolved configuration values.

use serde::Serialize;
use std::fmt;

/// Where a configuration value came from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Default,
    ConfigFile,
    Environment,
    CommandLine,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Environment => write!(f, "environment"),
            Self::CommandLine => write!(f, "command line"),
        }
    }
}

/// A value paired with the source that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
    /// Environment variable name, when the value came from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

impl<T> Sourced<T> {
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
            env_var: None,
        }
    }

    pub fn from_env(value: T, env_var: impl Into<String>) -> Self {
        Self {
            value,
            source: ConfigSource::Environment,
            env_var: Some(env_var.into()),
        }
    }

    pub fn from_file(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::ConfigFile,
            env_var: None,
        }
    }

    pub fn from_cli(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::CommandLine,
            env_var: None,
        }
    }

    /// Transform the value while keeping its provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            source: self.source,
            env_var: self.env_var,
        }
    }
}

impl<T> Sourced<Option<T>> {
    /// Keep `self` if it holds a value, otherwise fall back to `other`.
    pub fn or(self, other: Sourced<Option<T>>) -> Sourced<Option<T>> {
        if self.value.is_some() { self } else { other }
    }

    /// Unwrap the option, falling back to a default-sourced value.
    pub fn unwrap_or_else(self, default: impl FnOnce() -> T) -> Sourced<T> {
        match self.value {
            Some(value) => Sourced {
                value,
                source: self.source,
                env_var: self.env_var,
            },
            None => Sourced::default_value(default()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Sourced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.env_var {
            Some(var) => write!(f, "{} ({} {})", self.value, self.source, var),
            None => write!(f, "{} ({})", self.value, self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ordering_matches_precedence() {
        assert!(ConfigSource::CommandLine > ConfigSource::Environment);
        assert!(ConfigSource::Environment > ConfigSource::ConfigFile);
        assert!(ConfigSource::ConfigFile > ConfigSource::Default);
    }

    #[test]
    fn test_or_prefers_present_value() {
        let cli: Sourced<Option<&str>> = Sourced::from_cli(None);
        let env = Sourced::from_env(Some("env"), "GCLOUD_USER");
        let picked = cli.or(env);
        assert_eq!(picked.value, Some("env"));
        assert_eq!(picked.source, ConfigSource::Environment);
    }

    #[test]
    fn test_unwrap_or_else_marks_default() {
        let missing: Sourced<Option<u64>> = Sourced::from_file(None);
        let resolved = missing.unwrap_or_else(|| 30);
        assert_eq!(resolved.value, 30);
        assert_eq!(resolved.source, ConfigSource::Default);
    }

    #[test]
    fn test_display_includes_env_var() {
        let value = Sourced::from_env("dev", "CATALOG_ENVIRONMENT");
        assert_eq!(value.to_string(), "dev (environment CATALOG_ENVIRONMENT)");
    }
}
