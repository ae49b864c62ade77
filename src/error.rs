//! Error kinds raised while authenticating, fetching and writing attachments

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes used by the binary
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const CONFIG: u8 = 1;
    pub const AUTH: u8 = 2;
    pub const FETCH: u8 = 3;
    pub const RECORDS: u8 = 4;
    pub const OUTPUT: u8 = 5;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("no access token available, nothing was requested")]
    MissingToken,

    #[error("failed to fetch annotations{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Fetch { status: Option<u16>, message: String },

    #[error("record #{index} is not a valid annotation: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("annotation {annotation_id} has no '{field}' value")]
    MissingField {
        annotation_id: String,
        field: &'static str,
    },

    #[error("failed to decode payload of '{file_name}': {source}")]
    Decode {
        file_name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("refusing to write '{0}': not a plain file name")]
    UnsafeFileName(String),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Metadata(String),

    #[error("{skipped} of {fetched} records could not be exported")]
    Incomplete { skipped: usize, fetched: usize },
}

impl ExportError {
    /// Whether this error belongs to a single record rather than the whole run
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ExportError::InvalidRecord { .. }
                | ExportError::MissingField { .. }
                | ExportError::Decode { .. }
                | ExportError::UnsafeFileName(_)
                | ExportError::Write { .. }
        )
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::Config(_) => exit_codes::CONFIG,
            ExportError::Auth(_) | ExportError::MissingToken => exit_codes::AUTH,
            ExportError::Fetch { .. } => exit_codes::FETCH,
            ExportError::InvalidRecord { .. }
            | ExportError::MissingField { .. }
            | ExportError::Decode { .. }
            | ExportError::UnsafeFileName(_)
            | ExportError::Write { .. }
            | ExportError::Incomplete { .. } => exit_codes::RECORDS,
            ExportError::Output { .. } | ExportError::Metadata(_) => exit_codes::OUTPUT,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Output {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Metadata(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Metadata(err.to_string())
    }
}
