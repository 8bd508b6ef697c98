//! # aw-core
//!
//! Data model for Access Warden.
//!
//! This crate defines the normalized records produced by ingestion (HR records
//! and IT accounts grouped into a [`Snapshot`]), the [`Finding`] type emitted by
//! rule evaluators, and the [`SummaryRow`] tables derived from them. Nothing
//! here performs I/O.

pub mod error;
pub mod finding;
pub mod identity;
pub mod records;
pub mod snapshot;
pub mod summary;
pub mod system;

pub use error::ModelError;
pub use finding::{Finding, FindingDetail, IdleBucket, RuleName, Severity};
pub use identity::IdentityKey;
pub use records::{AccountStatus, DateField, EmploymentStatus, HrRecord, ItAccount};
pub use snapshot::{RecordIssue, Snapshot};
pub use summary::{SummaryCategory, SummaryRow, SummaryValue};
pub use system::SystemName;
