//! Error catalog for the catalog sync tool.
//!
//! Every failure an operator can hit maps to a stable code (SYNC-E001 through
//! SYNC-E599) with a message and remediation steps, so a failed run prints
//! something actionable instead of a bare HTTP status.
//!
//! # Error Code Ranges
//!
//! | Range      | Category | Description                                  |
//! |------------|----------|----------------------------------------------|
//! | E001-E099  | Config   | Configuration, environment and input files   |
//! | E100-E199  | Auth     | gcloud accounts and access tokens            |
//! | E200-E299  | Remote   | Catalog, Rawls and TDR HTTP calls            |
//! | E300-E399  | Metadata | Catalog entry content                        |
//! | E500-E599  | Internal | Internal/unexpected errors                   |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all sync failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// Config file contains invalid TOML
    ConfigFileParse,
    /// Environment variable has an invalid value
    ConfigEnvInvalid,
    /// A required value was not supplied
    ConfigMissingValue,
    /// A value is not one of the accepted choices
    ConfigUnknownValue,
    /// Input file could not be read
    InputFileRead,
    /// Input file is not valid JSON
    InputFileParse,
    /// Input JSON is not an object
    InputNotAnObject,

    // =========================================================================
    // Auth Errors (E100-E199)
    // =========================================================================
    /// gcloud executable could not be started
    AuthGcloudMissing,
    /// gcloud command exited with an error
    AuthGcloudFailed,
    /// Access token was empty
    AuthTokenEmpty,

    // =========================================================================
    // Remote Errors (E200-E299)
    // =========================================================================
    /// Request could not be sent or the response could not be read
    RemoteTransport,
    /// Service rejected the credentials (401)
    RemoteUnauthorized,
    /// Caller lacks permission (403)
    RemoteForbidden,
    /// Resource does not exist (404)
    RemoteNotFound,
    /// Service reported a server-side failure (5xx)
    RemoteServerError,
    /// Any other non-success status
    RemoteUnexpectedStatus,
    /// Response body did not have the expected shape
    RemoteInvalidResponse,
    /// Some items of a batch command failed
    RemoteBatchIncomplete,

    // =========================================================================
    // Metadata Errors (E300-E399)
    // =========================================================================
    /// Catalog entry failed validation
    MetadataInvalid,
    /// A field needed to address the entry is missing
    MetadataMissingField,

    // =========================================================================
    // Internal Errors (E500-E599)
    // =========================================================================
    /// Serialization failed
    InternalSerde,
    /// Logging could not be initialized
    InternalLogging,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            Self::ConfigFileParse => 1,
            Self::ConfigEnvInvalid => 2,
            Self::ConfigMissingValue => 3,
            Self::ConfigUnknownValue => 4,
            Self::InputFileRead => 10,
            Self::InputFileParse => 11,
            Self::InputNotAnObject => 12,

            Self::AuthGcloudMissing => 100,
            Self::AuthGcloudFailed => 101,
            Self::AuthTokenEmpty => 102,

            Self::RemoteTransport => 200,
            Self::RemoteUnauthorized => 201,
            Self::RemoteForbidden => 202,
            Self::RemoteNotFound => 203,
            Self::RemoteServerError => 204,
            Self::RemoteUnexpectedStatus => 205,
            Self::RemoteInvalidResponse => 206,
            Self::RemoteBatchIncomplete => 207,

            Self::MetadataInvalid => 300,
            Self::MetadataMissingField => 301,

            Self::InternalSerde => 500,
            Self::InternalLogging => 501,
        }
    }

    /// Returns the formatted error code string (e.g., "SYNC-E001").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("SYNC-E{:03}", self.code_number())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Config,
            100..=199 => ErrorCategory::Auth,
            200..=299 => ErrorCategory::Remote,
            300..=399 => ErrorCategory::Metadata,
            _ => ErrorCategory::Internal,
        }
    }

    /// Returns the full error entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ConfigFileParse => "Config file contains invalid TOML",
            Self::ConfigEnvInvalid => "Environment variable has an invalid value",
            Self::ConfigMissingValue => "A required setting was not provided",
            Self::ConfigUnknownValue => "Value is not one of the accepted choices",
            Self::InputFileRead => "Failed to read input file",
            Self::InputFileParse => "Input file is not valid JSON",
            Self::InputNotAnObject => "Input JSON must be an object",

            Self::AuthGcloudMissing => "gcloud could not be started",
            Self::AuthGcloudFailed => "gcloud command failed",
            Self::AuthTokenEmpty => "Access token is empty",

            Self::RemoteTransport => "Request could not be completed",
            Self::RemoteUnauthorized => "Service rejected the access token",
            Self::RemoteForbidden => "Caller is not permitted to perform this action",
            Self::RemoteNotFound => "Requested resource was not found",
            Self::RemoteServerError => "Service reported an internal error",
            Self::RemoteUnexpectedStatus => "Service returned an unexpected status",
            Self::RemoteInvalidResponse => "Service response had an unexpected shape",
            Self::RemoteBatchIncomplete => "Some items of the batch failed",

            Self::MetadataInvalid => "Catalog entry failed validation",
            Self::MetadataMissingField => "Catalog entry is missing a required field",

            Self::InternalSerde => "Failed to serialize data",
            Self::InternalLogging => "Failed to initialize logging",
        }
    }

    /// Returns remediation steps for the error.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ConfigFileParse => &[
                "Check the TOML syntax of the config file",
                "Run 'catalog-sync config show --config /dev/null' to ignore the file",
            ],
            Self::ConfigEnvInvalid => &[
                "Inspect the variables named in the error",
                "Unset them to fall back to defaults",
            ],
            Self::ConfigMissingValue => &[
                "Pass the value as a command-line flag",
                "Or export the matching environment variable",
            ],
            Self::ConfigUnknownValue => &["Use one of the values listed in the error"],
            Self::InputFileRead => &[
                "Verify the path exists and is readable",
                "Paths are resolved relative to the current directory",
            ],
            Self::InputFileParse => &[
                "Validate the file with 'jq . <file>'",
                "Check for trailing commas or comments",
            ],
            Self::InputNotAnObject => &["Wrap the metadata in a top-level JSON object"],

            Self::AuthGcloudMissing => &[
                "Install the Google Cloud SDK",
                "Or set GCLOUD_BIN to the gcloud executable",
                "Or export AUTH_TOKEN to skip gcloud entirely",
            ],
            Self::AuthGcloudFailed => &[
                "Run 'gcloud auth login <user>' manually to see the full error",
                "Check that the account exists and is allowed in this environment",
            ],
            Self::AuthTokenEmpty => &[
                "Run 'gcloud auth print-access-token' to confirm a token is issued",
                "Check that AUTH_TOKEN is not set to an empty value",
            ],

            Self::RemoteTransport => &[
                "Check network connectivity and VPN",
                "Verify the service URL with 'catalog-sync config show'",
                "Increase CATALOG_SYNC_TIMEOUT_SECS for slow environments",
            ],
            Self::RemoteUnauthorized => &[
                "Refresh credentials: gcloud auth login <user>",
                "Confirm the account is registered in this Terra environment",
            ],
            Self::RemoteForbidden => &[
                "Use an account with catalog admin or steward access",
                "For TDR snapshots, confirm the steward policy was granted",
            ],
            Self::RemoteNotFound => &[
                "Check the id, namespace and name for typos",
                "Confirm the resource exists in the selected environment",
            ],
            Self::RemoteServerError => &[
                "Retry the command later",
                "Inspect the request dump logged above for malformed metadata",
            ],
            Self::RemoteUnexpectedStatus => &["Inspect the request dump logged above"],
            Self::RemoteInvalidResponse => &[
                "Confirm the service URL points at the right service",
                "Re-run with --verbose to see the raw response",
            ],
            Self::RemoteBatchIncomplete => &[
                "Review the per-item errors logged above",
                "Re-run the command; finished items are skipped or updated in place",
            ],

            Self::MetadataInvalid => &[
                "Fix the fields listed in the validation report",
                "Use --skip-validation only for entries the service is known to accept",
            ],
            Self::MetadataMissingField => &[
                "Add the field to the metadata file",
                "Collection entries need a dct:identifier",
            ],

            Self::InternalSerde => &["Report this as a bug with the input that triggered it"],
            Self::InternalLogging => &[
                "Check that CATALOG_SYNC_LOG_FILE points at a writable location",
                "Unset CATALOG_SYNC_LOG_FORMAT to use the default format",
            ],
        }
    }

    /// Returns all error codes.
    #[must_use]
    pub const fn all() -> &'static [ErrorCode] {
        &[
            Self::ConfigFileParse,
            Self::ConfigEnvInvalid,
            Self::ConfigMissingValue,
            Self::ConfigUnknownValue,
            Self::InputFileRead,
            Self::InputFileParse,
            Self::InputNotAnObject,
            Self::AuthGcloudMissing,
            Self::AuthGcloudFailed,
            Self::AuthTokenEmpty,
            Self::RemoteTransport,
            Self::RemoteUnauthorized,
            Self::RemoteForbidden,
            Self::RemoteNotFound,
            Self::RemoteServerError,
            Self::RemoteUnexpectedStatus,
            Self::RemoteInvalidResponse,
            Self::RemoteBatchIncomplete,
            Self::MetadataInvalid,
            Self::MetadataMissingField,
            Self::InternalSerde,
            Self::InternalLogging,
        ]
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Configuration, environment and input files (E001-E099)
    Config,
    /// gcloud accounts and tokens (E100-E199)
    Auth,
    /// HTTP calls to catalog, Rawls and TDR (E200-E299)
    Remote,
    /// Catalog entry content (E300-E399)
    Metadata,
    /// Internal/unexpected errors (E500-E599)
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Auth => "Authentication",
            Self::Remote => "Remote",
            Self::Metadata => "Metadata",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete error entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "SYNC-E001")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
}

impl ErrorEntry {
    /// Formats the error for display with full remediation steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let mut output = format!("[{}] {}\n", self.code, self.message);

        if !self.remediation.is_empty() {
            output.push_str("\nRemediation steps:\n");
            for (i, step) in self.remediation.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        output
    }

    /// Formats the error as a single line.
    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}
