//! Inspection engine.
//!
//! The [`Inspector`] runs every registered rule against a snapshot, isolates
//! rule failures into their own section, and folds the surviving outcomes
//! into summary tables. A failing rule never affects the other sections.

use crate::aggregator::{Aggregator, SummaryTables};
use crate::config::{ConfigError, InspectionConfig};
use crate::rules::{EvaluationContext, EvaluationError, Rule, RuleOutcome, RuleRegistry};
use aw_core::{Finding, IdentityKey, RuleName, Snapshot, SystemName};
use aw_observability::{rule_span, run_span};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, Instrument, Span};

/// Run-level errors. These abort the inspection before any rule runs.
#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("Required system {0} was not loaded")]
    MissingSystem(SystemName),

    #[error("Inspection configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A section of the report that could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Section {section} failed: {reason}")]
pub struct RuleFailure {
    /// Rule name, or `summary` for the aggregation step.
    pub section: String,
    /// Why it failed.
    pub reason: String,
}

impl From<EvaluationError> for RuleFailure {
    fn from(err: EvaluationError) -> Self {
        Self {
            section: err.rule().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of one rule, or the reason it is missing.
pub type SectionResult = Result<RuleOutcome, RuleFailure>;

/// Everything one run produced, handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    /// Date the review was run as of.
    pub run_date: NaiveDate,
    /// Per-rule sections.
    pub sections: BTreeMap<RuleName, SectionResult>,
    /// Summary tables, unless aggregation itself failed.
    pub summaries: Result<SummaryTables, RuleFailure>,
    /// Records the run was computed from, for detail sheets.
    #[serde(skip)]
    pub snapshot: Arc<Snapshot>,
}

impl InspectionReport {
    /// Gets a section by rule.
    pub fn section(&self, rule: RuleName) -> Option<&SectionResult> {
        self.sections.get(&rule)
    }

    /// Findings of a rule; empty if the rule failed or did not run.
    pub fn findings_for(&self, rule: RuleName) -> &[Finding] {
        match self.sections.get(&rule) {
            Some(Ok(outcome)) => &outcome.findings,
            _ => &[],
        }
    }

    /// All findings of successful sections.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.sections
            .values()
            .filter_map(|s| s.as_ref().ok())
            .flat_map(|o| o.findings.iter())
    }

    /// Number of findings across successful sections.
    pub fn finding_count(&self) -> usize {
        self.findings().count()
    }

    /// Sections that failed, including the summary.
    pub fn failed_sections(&self) -> Vec<&RuleFailure> {
        self.sections
            .values()
            .filter_map(|s| s.as_ref().err())
            .chain(self.summaries.as_ref().err())
            .collect()
    }

    /// Returns true if every section and the summary were produced.
    pub fn is_complete(&self) -> bool {
        self.failed_sections().is_empty()
    }
}

/// Runs the registered rules and builds the report.
#[derive(Debug, Clone)]
pub struct Inspector {
    config: InspectionConfig,
    registry: RuleRegistry,
}

impl Inspector {
    /// Creates an inspector with the built-in rules.
    pub fn new(config: InspectionConfig) -> Self {
        Self::with_registry(config, RuleRegistry::with_default_rules())
    }

    /// Creates an inspector with a custom rule set.
    pub fn with_registry(config: InspectionConfig, registry: RuleRegistry) -> Self {
        Self { config, registry }
    }

    /// Returns the inspection configuration.
    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Returns the rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Runs sequentially or on the blocking pool, per configuration.
    pub async fn run(
        &self,
        snapshot: Arc<Snapshot>,
        run_date: NaiveDate,
    ) -> Result<InspectionReport, InspectionError> {
        if self.config.parallel_evaluators {
            self.inspect_parallel(snapshot, run_date).await
        } else {
            self.inspect(snapshot, run_date)
        }
    }

    /// Evaluates every rule in registration order on the current thread.
    pub fn inspect(
        &self,
        snapshot: Arc<Snapshot>,
        run_date: NaiveDate,
    ) -> Result<InspectionReport, InspectionError> {
        self.preflight(&snapshot)?;

        let span = run_span!(run_date, rules = self.registry.rules().len());
        let _enter = span.enter();
        info!("Starting inspection");

        let ctx = EvaluationContext::new(&snapshot, run_date, &self.config);
        let sections = self
            .registry
            .rules()
            .iter()
            .map(|rule| (rule.name(), evaluate_rule(rule.as_ref(), &ctx)))
            .collect();

        Ok(self.finish(snapshot, run_date, sections))
    }

    /// Evaluates every rule concurrently on tokio's blocking pool.
    ///
    /// Produces the same report as [`Inspector::inspect`].
    pub async fn inspect_parallel(
        &self,
        snapshot: Arc<Snapshot>,
        run_date: NaiveDate,
    ) -> Result<InspectionReport, InspectionError> {
        self.preflight(&snapshot)?;

        let span = run_span!(run_date, rules = self.registry.rules().len(), parallel = true);
        async {
            info!("Starting parallel inspection");
            let config = Arc::new(self.config.clone());

            let handles: Vec<_> = self
                .registry
                .rules()
                .iter()
                .map(|rule| {
                    let name = rule.name();
                    let rule = Arc::clone(rule);
                    let snapshot = Arc::clone(&snapshot);
                    let config = Arc::clone(&config);
                    let parent = Span::current();
                    let handle = tokio::task::spawn_blocking(move || {
                        parent.in_scope(|| {
                            let ctx = EvaluationContext::new(&snapshot, run_date, &config);
                            evaluate_rule(rule.as_ref(), &ctx)
                        })
                    });
                    (name, handle)
                })
                .collect();

            let mut sections = BTreeMap::new();
            for (name, handle) in handles {
                let section = match handle.await {
                    Ok(section) => section,
                    Err(err) => {
                        error!(rule = %name, "Rule task failed: {}", err);
                        Err(RuleFailure::from(EvaluationError::Join {
                            rule: name,
                            message: err.to_string(),
                        }))
                    }
                };
                sections.insert(name, section);
            }

            Ok(self.finish(snapshot, run_date, sections))
        }
        .instrument(span)
        .await
    }

    fn preflight(&self, snapshot: &Snapshot) -> Result<(), InspectionError> {
        self.config.validate()?;
        if !snapshot.is_loaded(SystemName::HrSource) {
            return Err(InspectionError::MissingSystem(SystemName::HrSource));
        }
        Ok(())
    }

    fn finish(
        &self,
        snapshot: Arc<Snapshot>,
        run_date: NaiveDate,
        sections: BTreeMap<RuleName, SectionResult>,
    ) -> InspectionReport {
        let aggregator = Aggregator::new(&snapshot, run_date, &self.config);
        let summaries = panic::catch_unwind(AssertUnwindSafe(|| aggregator.summarize(&sections)))
            .map_err(|payload| {
                let failure = RuleFailure {
                    section: "summary".to_string(),
                    reason: panic_message(payload.as_ref()),
                };
                error!("{}", failure);
                failure
            });

        let report = InspectionReport {
            run_date,
            sections,
            summaries,
            snapshot,
        };
        info!(
            findings = report.finding_count(),
            failed_sections = report.failed_sections().len(),
            "Inspection complete"
        );
        report
    }
}

/// Evaluates one rule, turning panics and invariant breaches into a failure.
fn evaluate_rule(rule: &dyn Rule, ctx: &EvaluationContext<'_>) -> SectionResult {
    let name = rule.name();
    let span = rule_span!(name, ctx.run_date);
    let _enter = span.enter();
    debug!("Evaluating rule");

    let result = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(ctx)))
        .unwrap_or_else(|payload| {
            Err(EvaluationError::Panicked {
                rule: name,
                message: panic_message(payload.as_ref()),
            })
        })
        .and_then(|outcome| {
            check_outcome(name, &outcome, ctx.snapshot)?;
            Ok(outcome)
        });

    match &result {
        Ok(outcome) => info!(
            checked = outcome.checked,
            findings = outcome.findings.len(),
            "Rule evaluated"
        ),
        Err(err) => error!("Rule failed: {}", err),
    }

    result.map_err(RuleFailure::from)
}

/// Every finding must belong to the rule and reference a known identity.
fn check_outcome(
    rule: RuleName,
    outcome: &RuleOutcome,
    snapshot: &Snapshot,
) -> Result<(), EvaluationError> {
    let violation = |message: String| EvaluationError::InvariantViolation { rule, message };

    if outcome.rule != rule {
        return Err(violation(format!("outcome labelled {}", outcome.rule)));
    }
    let known: HashSet<&IdentityKey> = snapshot
        .hr_records()
        .iter()
        .map(|r| &r.identity_key)
        .chain(snapshot.all_accounts().map(|a| &a.identity_key))
        .collect();
    for finding in &outcome.findings {
        if finding.rule != rule {
            return Err(violation(format!(
                "finding for {} labelled {}",
                finding.identity_key, finding.rule
            )));
        }
        if !known.contains(&finding.identity_key) {
            return Err(violation(format!(
                "finding references unknown identity {}",
                finding.identity_key
            )));
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
