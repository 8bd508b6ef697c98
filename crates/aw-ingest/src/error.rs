//! Errors raised while loading extracts.

use aw_core::{ModelError, SystemName};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a system's extract from loading.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No extract found for {system}: expected {path}")]
    MissingFile { system: SystemName, path: PathBuf },

    #[error("{system} extract is missing required column '{column}'")]
    MissingColumn { system: SystemName, column: String },

    #[error("Invalid service account pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
