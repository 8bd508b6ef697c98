//! # aw-ingest
//!
//! Loads the HR and IT system extracts of one review into an
//! [`aw_core::Snapshot`].
//!
//! Each system has an [`ExtractAdapter`] that knows its file name, its
//! required columns, and how to turn a row into a record. Dates are
//! normalized by [`DateNormalizer`]; values that cannot be normalized become
//! [`aw_core::RecordIssue`]s instead of failing the load.

pub mod adapters;
pub mod config;
pub mod dates;
pub mod error;
pub mod loader;
pub mod table;

pub use adapters::{adapter_for, default_adapters, ExtractAdapter, ExtractRecord};
pub use config::{DateOrder, IngestionConfig};
pub use dates::{DateNormalizer, DateParseError};
pub use error::IngestError;
pub use loader::SnapshotLoader;
pub use table::{DateCell, ExtractTable, RowReader};
