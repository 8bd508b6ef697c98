//! Rule trait and registry.
//!
//! Every compliance rule is a stateless [`Rule`] evaluated against an
//! [`EvaluationContext`]. Rules never share state, so the engine may run them
//! in any order or concurrently.

use crate::config::InspectionConfig;
use aw_core::{Finding, RuleName, Snapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod data_quality;
pub mod idle;
pub mod joiner;
pub mod leaver;
pub mod system_user;

pub use data_quality::DataQualityRule;
pub use idle::IdleRule;
pub use joiner::JoinerRule;
pub use leaver::LeaverRule;
pub use system_user::SystemUserRule;

/// Errors raised while evaluating a single rule.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationError {
    #[error("Rule {rule} violated an invariant: {message}")]
    InvariantViolation { rule: RuleName, message: String },

    #[error("Rule {rule} panicked: {message}")]
    Panicked { rule: RuleName, message: String },

    #[error("Rule {rule} could not be joined: {message}")]
    Join { rule: RuleName, message: String },
}

impl EvaluationError {
    /// The rule that failed.
    pub fn rule(&self) -> RuleName {
        match self {
            EvaluationError::InvariantViolation { rule, .. }
            | EvaluationError::Panicked { rule, .. }
            | EvaluationError::Join { rule, .. } => *rule,
        }
    }
}

/// Read-only inputs shared by all rules in a run.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Normalized records.
    pub snapshot: &'a Snapshot,
    /// Date the review is run as of.
    pub run_date: NaiveDate,
    /// Inspection settings.
    pub config: &'a InspectionConfig,
}

impl<'a> EvaluationContext<'a> {
    /// Creates a context.
    pub fn new(snapshot: &'a Snapshot, run_date: NaiveDate, config: &'a InspectionConfig) -> Self {
        Self {
            snapshot,
            run_date,
            config,
        }
    }

    /// Returns true if a joining/exit date falls inside the review period.
    pub fn in_review_period(&self, date: NaiveDate) -> bool {
        self.config
            .period_start(self.run_date)
            .map_or(true, |start| date >= start)
    }
}

/// Findings of one rule plus how many subjects it examined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule that produced the outcome.
    pub rule: RuleName,
    /// Number of records the rule examined.
    pub checked: usize,
    /// Findings, sorted.
    pub findings: Vec<Finding>,
}

impl RuleOutcome {
    /// Starts an empty outcome.
    pub fn new(rule: RuleName) -> Self {
        Self {
            rule,
            checked: 0,
            findings: Vec::new(),
        }
    }

    /// Counts one examined record.
    pub fn record_checked(&mut self) {
        self.checked += 1;
    }

    /// Adds a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Sorts findings so output does not depend on input order.
    pub fn finish(mut self) -> Self {
        self.findings.sort();
        self
    }
}

/// A compliance rule.
pub trait Rule: Send + Sync {
    /// Name of the rule.
    fn name(&self) -> RuleName;

    /// Evaluates the rule.
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError>;
}

/// Ordered set of rules the engine runs.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in rule.
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JoinerRule));
        registry.register(Arc::new(LeaverRule));
        registry.register(Arc::new(IdleRule));
        registry.register(Arc::new(SystemUserRule));
        registry.register(Arc::new(DataQualityRule));
        registry
    }

    /// Adds a rule, replacing any rule with the same name.
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.retain(|r| r.name() != rule.name());
        self.rules.push(rule);
    }

    /// Gets a rule by name.
    pub fn get(&self, name: RuleName) -> Option<Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.name() == name).cloned()
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Names of the registered rules.
    pub fn names(&self) -> Vec<RuleName> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = RuleRegistry::with_default_rules();
        assert_eq!(registry.names(), RuleName::ALL.to_vec());
        assert!(registry.get(RuleName::Idle).is_some());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = RuleRegistry::with_default_rules();
        registry.register(Arc::new(IdleRule));
        assert_eq!(registry.rules().len(), RuleName::ALL.len());
        assert_eq!(registry.names().last(), Some(&RuleName::Idle));
    }
}
