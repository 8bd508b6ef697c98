//! Joiner rule: were accounts provisioned on time for new employees?

use super::{EvaluationContext, EvaluationError, Rule, RuleOutcome};
use aw_core::{
    DateField, Finding, FindingDetail, IdentityKey, ItAccount, RuleName, Severity, SystemName,
};
use chrono::Duration;
use std::collections::HashMap;
use tracing::debug;

/// Checks account creation dates against joining dates.
///
/// For every non-terminated employee with a joining date inside the review
/// period, each expected system must hold an account created no later than
/// `joining date + joiner_grace_days`. Accounts created before the joining
/// date are reported at low severity for review.
///
/// Dates present in an extract but unparseable are left to the data-quality
/// section rather than judged.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinerRule;

impl Rule for JoinerRule {
    fn name(&self) -> RuleName {
        RuleName::Joiner
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError> {
        let mut outcome = RuleOutcome::new(RuleName::Joiner);
        let grace = i64::from(ctx.config.joiner_grace_days);

        let mut expected: Vec<SystemName> = ctx
            .config
            .joiner_expected_systems
            .iter()
            .copied()
            .filter(|s| ctx.snapshot.is_loaded(*s))
            .collect();
        expected.sort();
        expected.dedup();

        let indexes: Vec<(SystemName, HashMap<&IdentityKey, Vec<&ItAccount>>)> = expected
            .iter()
            .map(|s| (*s, ctx.snapshot.accounts_by_identity(*s)))
            .collect();

        for record in ctx.snapshot.hr_records() {
            if record.employment_status.is_terminated()
                || record.is_unreadable(DateField::JoinDate)
            {
                continue;
            }

            let Some(join_date) = record.join_date else {
                outcome.record_checked();
                outcome.push(Finding::new(
                    RuleName::Joiner,
                    record.identity_key.clone(),
                    SystemName::HrSource,
                    Severity::Low,
                    FindingDetail::missing("join_date", "employee has no joining date"),
                ));
                continue;
            };

            if !ctx.in_review_period(join_date) {
                continue;
            }
            outcome.record_checked();

            for (system, index) in &indexes {
                let Some(accounts) = index.get(&record.identity_key) else {
                    // Not due yet while still inside the grace window.
                    if ctx.run_date > join_date + Duration::days(grace) {
                        outcome.push(Finding::new(
                            RuleName::Joiner,
                            record.identity_key.clone(),
                            *system,
                            Severity::High,
                            FindingDetail::NoAccountProvisioned { join_date },
                        ));
                    }
                    continue;
                };

                if accounts
                    .iter()
                    .any(|a| a.is_unreadable(DateField::AccountCreatedDate))
                {
                    continue;
                }

                let Some(created_date) = accounts
                    .iter()
                    .filter_map(|a| a.account_created_date)
                    .min()
                else {
                    outcome.push(Finding::new(
                        RuleName::Joiner,
                        record.identity_key.clone(),
                        *system,
                        Severity::Low,
                        FindingDetail::missing(
                            "account_created_date",
                            "no account creation date in extract",
                        ),
                    ));
                    continue;
                };

                let delta = (created_date - join_date).num_days();
                debug!(
                    identity = %record.identity_key,
                    system = %system,
                    delta,
                    "Joiner provisioning delta"
                );

                if delta > grace {
                    outcome.push(Finding::new(
                        RuleName::Joiner,
                        record.identity_key.clone(),
                        *system,
                        Severity::Medium,
                        FindingDetail::LateProvisioning {
                            join_date,
                            created_date,
                            days_late: delta,
                        },
                    ));
                } else if delta < 0 {
                    outcome.push(Finding::new(
                        RuleName::Joiner,
                        record.identity_key.clone(),
                        *system,
                        Severity::Low,
                        FindingDetail::EarlyProvisioning {
                            join_date,
                            created_date,
                            days_early: -delta,
                        },
                    ));
                }
            }
        }

        Ok(outcome.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectionConfig;
    use crate::rules::test_support::{account, date, employee, key};
    use aw_core::{EmploymentStatus, HrRecord, Snapshot};

    fn snapshot(hr: Vec<HrRecord>, accounts: Vec<ItAccount>) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.set_hr_records(hr);
        for system in SystemName::IT_SYSTEMS {
            let accounts = accounts
                .iter()
                .filter(|a| a.system == system)
                .cloned()
                .collect();
            snapshot.set_accounts(system, accounts).unwrap();
        }
        snapshot
    }

    fn evaluate(snapshot: &Snapshot, config: &InspectionConfig) -> RuleOutcome {
        let ctx = EvaluationContext::new(snapshot, date(2024, 6, 1), config);
        JoinerRule.evaluate(&ctx).unwrap()
    }

    fn only_idp() -> InspectionConfig {
        InspectionConfig {
            joiner_expected_systems: vec![SystemName::IdentityProvider],
            ..Default::default()
        }
    }

    #[test]
    fn test_late_provisioning_reports_days_late() {
        let snapshot = snapshot(
            vec![employee("u1@example.com").with_join_date(date(2024, 1, 10))],
            vec![account("u1@example.com", SystemName::IdentityProvider)
                .with_created_date(date(2024, 1, 20))],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.checked, 1);
        assert_eq!(outcome.findings.len(), 1);

        let finding = &outcome.findings[0];
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.system, SystemName::IdentityProvider);
        assert_eq!(
            finding.detail,
            FindingDetail::LateProvisioning {
                join_date: date(2024, 1, 10),
                created_date: date(2024, 1, 20),
                days_late: 10,
            }
        );
    }

    #[test]
    fn test_grace_period_boundary() {
        let join = date(2024, 1, 10);
        let config = InspectionConfig {
            joiner_grace_days: 3,
            ..only_idp()
        };

        for (created_offset, expect_finding) in [(0, false), (3, false), (4, true)] {
            let snapshot = snapshot(
                vec![employee("u1@example.com").with_join_date(join)],
                vec![account("u1@example.com", SystemName::IdentityProvider)
                    .with_created_date(join + Duration::days(created_offset))],
            );
            let outcome = evaluate(&snapshot, &config);
            assert_eq!(
                !outcome.findings.is_empty(),
                expect_finding,
                "offset {}",
                created_offset
            );
        }
    }

    #[test]
    fn test_missing_account_is_high() {
        let snapshot = snapshot(
            vec![employee("u1@example.com").with_join_date(date(2024, 1, 10))],
            vec![account("u1@example.com", SystemName::IdentityProvider)
                .with_created_date(date(2024, 1, 10))],
        );

        let outcome = evaluate(&snapshot, &InspectionConfig::default());
        let missing: Vec<_> = outcome
            .findings
            .iter()
            .filter(|f| matches!(f.detail, FindingDetail::NoAccountProvisioned { .. }))
            .collect();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|f| f.severity == Severity::High));
    }

    #[test]
    fn test_future_joiner_without_account_is_not_due() {
        let snapshot = snapshot(
            vec![HrRecord::new(key("new@example.com"), EmploymentStatus::Pending)
                .with_join_date(date(2024, 7, 1))],
            vec![],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.checked, 1);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_early_provisioning_is_low() {
        let snapshot = snapshot(
            vec![employee("u1@example.com").with_join_date(date(2024, 1, 10))],
            vec![account("u1@example.com", SystemName::IdentityProvider)
                .with_created_date(date(2024, 1, 5))],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].severity, Severity::Low);
        assert!(matches!(
            outcome.findings[0].detail,
            FindingDetail::EarlyProvisioning { days_early: 5, .. }
        ));
    }

    #[test]
    fn test_earliest_of_duplicate_accounts_wins() {
        let snapshot = snapshot(
            vec![employee("u1@example.com").with_join_date(date(2024, 1, 10))],
            vec![
                account("u1@example.com", SystemName::IdentityProvider)
                    .with_created_date(date(2024, 2, 1)),
                account("U1@example.com", SystemName::IdentityProvider)
                    .with_created_date(date(2024, 1, 10)),
            ],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_null_dates_become_missing_data() {
        let snapshot = snapshot(
            vec![
                employee("nodate@example.com"),
                employee("u1@example.com").with_join_date(date(2024, 1, 10)),
            ],
            vec![account("u1@example.com", SystemName::IdentityProvider)],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.findings.len(), 2);
        assert!(outcome.findings.iter().all(Finding::is_data_quality));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.system == SystemName::HrSource));
    }

    #[test]
    fn test_unrecognised_status_without_join_date() {
        let snapshot = snapshot(
            vec![HrRecord::new(
                key("contractor@example.com"),
                EmploymentStatus::Other("Consultant".to_string()),
            )],
            vec![],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.checked, 1);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(
            outcome.findings[0].detail,
            FindingDetail::missing("join_date", "employee has no joining date")
        );
    }

    #[test]
    fn test_unreadable_dates_not_judged() {
        let snapshot = snapshot(
            vec![
                employee("bad.join@example.com").with_unreadable(DateField::JoinDate),
                employee("u1@example.com").with_join_date(date(2024, 1, 10)),
            ],
            vec![
                account("u1@example.com", SystemName::IdentityProvider)
                    .with_created_date(date(2024, 3, 1)),
                account("u1@example.com", SystemName::IdentityProvider)
                    .with_unreadable(DateField::AccountCreatedDate),
            ],
        );

        let outcome = evaluate(&snapshot, &only_idp());
        assert_eq!(outcome.checked, 1);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_terminated_and_out_of_period_skipped() {
        let config = InspectionConfig {
            review_period: crate::config::ReviewPeriod::FinancialYear,
            ..only_idp()
        };
        let snapshot = snapshot(
            vec![
                HrRecord::new(key("gone@example.com"), EmploymentStatus::Terminated)
                    .with_join_date(date(2024, 5, 1)),
                employee("old@example.com").with_join_date(date(2023, 1, 1)),
            ],
            vec![],
        );

        let outcome = evaluate(&snapshot, &config);
        assert_eq!(outcome.checked, 0);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_unloaded_system_not_expected() {
        let mut snapshot = Snapshot::new();
        snapshot.set_hr_records(vec![
            employee("u1@example.com").with_join_date(date(2024, 1, 10))
        ]);

        let outcome = evaluate(&snapshot, &InspectionConfig::default());
        assert_eq!(outcome.checked, 1);
        assert!(outcome.findings.is_empty());
    }
}
