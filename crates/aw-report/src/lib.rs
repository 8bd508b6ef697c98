//! # aw-report
//!
//! Renders an [`aw_inspect::InspectionReport`] into an output directory:
//! a summary sheet, one findings sheet per rule, record detail sheets and a
//! JSON copy of the whole report. [`ConsoleSummary`] prints the short form
//! to a terminal.

pub mod config;
pub mod console;
pub mod error;
pub mod rows;
pub mod writer;

pub use config::ReportConfig;
pub use console::ConsoleSummary;
pub use error::ReportError;
pub use rows::{AccountRow, FindingRow, HrRow, SummaryCsvRow};
pub use writer::{ReportWriter, WrittenReport};
