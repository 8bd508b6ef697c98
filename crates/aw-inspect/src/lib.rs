//! # aw-inspect
//!
//! Compliance inspection engine for Access Warden.
//!
//! This crate evaluates the joiner, leaver, idle and system-user rules over a
//! normalized [`aw_core::Snapshot`], folds their findings into summary tables,
//! and returns everything as one [`InspectionReport`]. It performs no I/O.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod rules;

pub use aggregator::{Aggregator, SummaryTables};
pub use config::{ConfigError, InspectionConfig, ReviewPeriod};
pub use engine::{InspectionError, InspectionReport, Inspector, RuleFailure, SectionResult};
pub use rules::{
    EvaluationContext, EvaluationError, Rule, RuleOutcome, RuleRegistry,
};
