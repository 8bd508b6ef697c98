//! Surfaces ingestion issues as findings.

use super::{EvaluationContext, EvaluationError, Rule, RuleOutcome};
use aw_core::{Finding, FindingDetail, RuleName, Severity};

/// Turns attributable [`aw_core::RecordIssue`]s into invalid-value findings.
///
/// Issues without an identity key (skipped rows) have no subject to report
/// against and are only counted in the summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataQualityRule;

impl Rule for DataQualityRule {
    fn name(&self) -> RuleName {
        RuleName::DataQuality
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError> {
        let mut outcome = RuleOutcome::new(RuleName::DataQuality);

        for issue in ctx.snapshot.issues() {
            outcome.record_checked();
            let Some(identity_key) = &issue.identity_key else {
                continue;
            };
            if !ctx.snapshot.contains_identity(identity_key) {
                continue;
            }

            outcome.push(Finding::new(
                RuleName::DataQuality,
                identity_key.clone(),
                issue.system,
                Severity::Low,
                FindingDetail::InvalidValue {
                    field: issue.field.clone(),
                    raw_value: issue.raw_value.clone(),
                    reason: issue.reason.clone(),
                },
            ));
        }

        Ok(outcome.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectionConfig;
    use crate::rules::test_support::{date, employee, key};
    use aw_core::{RecordIssue, Snapshot, SystemName};

    #[test]
    fn test_attributable_issues_become_findings() {
        let mut snapshot = Snapshot::new();
        snapshot.set_hr_records(vec![employee("u1@example.com")]);
        snapshot.push_issue(RecordIssue {
            system: SystemName::HrSource,
            row: 2,
            identity_key: Some(key("u1@example.com")),
            field: "Date Of Joining".to_string(),
            raw_value: "31/31/2024".to_string(),
            reason: "unrecognized date".to_string(),
        });
        snapshot.push_issue(RecordIssue {
            system: SystemName::HrSource,
            row: 3,
            identity_key: None,
            field: "Official Email ID".to_string(),
            raw_value: String::new(),
            reason: "empty identity key".to_string(),
        });

        let config = InspectionConfig::default();
        let ctx = EvaluationContext::new(&snapshot, date(2024, 6, 1), &config);
        let outcome = DataQualityRule.evaluate(&ctx).unwrap();

        assert_eq!(outcome.checked, 2);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].is_data_quality());
        assert_eq!(outcome.findings[0].identity_key, key("u1@example.com"));
    }
}
