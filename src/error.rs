// Error types shared by the validator, the correlation engine and the loader.

use std::path::PathBuf;
use thiserror::Error;

/// A payload that does not match the snapshot schema. `path` points at the offending field,
/// e.g. `dashboard.panels[2].snapshotData[0]`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("schema validation failed at `{path}`: {message}")]
pub struct SchemaValidationError {
    pub path: String,
    pub message: String,
}

impl SchemaValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BucketSizeError {
    #[error("bucket size is empty")]
    Empty,

    #[error("bucket size `{0}` is not <number><unit>")]
    Invalid(String),

    #[error("bucket size `{0}` has an unknown unit (expected ms, s, min, m or h)")]
    UnknownUnit(String),

    #[error("bucket size `{0}` must be positive")]
    NonPositive(String),
}

/// Per-document failure while reading already-fetched inputs from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaValidationError,
    },
}
