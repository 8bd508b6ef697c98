//! Leaver rule: was access revoked when people left?

use super::{EvaluationContext, EvaluationError, Rule, RuleOutcome};
use aw_core::{DateField, Finding, FindingDetail, RuleName, Severity, SystemName};
use tracing::debug;

/// Checks that accounts of people who have left are no longer active.
///
/// Exits on or after the run date are not yet due and are skipped. So are
/// records whose exit date could not be read; the data-quality section
/// reports those.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaverRule;

impl Rule for LeaverRule {
    fn name(&self) -> RuleName {
        RuleName::Leaver
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError> {
        let mut outcome = RuleOutcome::new(RuleName::Leaver);
        let grace = i64::from(ctx.config.leaver_grace_days);

        let indexes: Vec<_> = ctx
            .snapshot
            .loaded_it_systems()
            .into_iter()
            .map(|s| (s, ctx.snapshot.accounts_by_identity(s)))
            .collect();

        for record in ctx.snapshot.hr_records() {
            if record.is_unreadable(DateField::ExitDate) {
                continue;
            }
            let Some(exit_date) = record.exit_date else {
                if record.employment_status.is_terminated() {
                    outcome.record_checked();
                    outcome.push(Finding::new(
                        RuleName::Leaver,
                        record.identity_key.clone(),
                        SystemName::HrSource,
                        Severity::Low,
                        FindingDetail::MissingExitDate {
                            employment_status: record.employment_status.clone(),
                        },
                    ));
                }
                continue;
            };

            if exit_date >= ctx.run_date || !ctx.in_review_period(exit_date) {
                continue;
            }
            outcome.record_checked();
            let days_since_exit = (ctx.run_date - exit_date).num_days();

            for (system, index) in &indexes {
                let Some(accounts) = index.get(&record.identity_key) else {
                    continue;
                };

                if let Some(last_login_date) = accounts
                    .iter()
                    .filter_map(|a| a.last_login_date)
                    .filter(|d| *d > exit_date)
                    .max()
                {
                    outcome.push(Finding::new(
                        RuleName::Leaver,
                        record.identity_key.clone(),
                        *system,
                        Severity::High,
                        FindingDetail::LoginAfterExit {
                            exit_date,
                            last_login_date,
                            days_after_exit: (last_login_date - exit_date).num_days(),
                        },
                    ));
                }

                let still_enabled = accounts
                    .iter()
                    .find(|a| !a.account_status.is_revoked() && !a.account_status.is_unknown());

                match still_enabled {
                    Some(account) => {
                        debug!(
                            identity = %record.identity_key,
                            system = %system,
                            status = %account.account_status,
                            days_since_exit,
                            "Leaver account still enabled"
                        );
                        if days_since_exit > grace {
                            outcome.push(Finding::new(
                                RuleName::Leaver,
                                record.identity_key.clone(),
                                *system,
                                Severity::High,
                                FindingDetail::AccessNotRevoked {
                                    exit_date,
                                    account_status: account.account_status.clone(),
                                    days_since_exit,
                                },
                            ));
                        }
                    }
                    None => {
                        if let Some(unknown) =
                            accounts.iter().find(|a| a.account_status.is_unknown())
                        {
                            outcome.push(Finding::new(
                                RuleName::Leaver,
                                record.identity_key.clone(),
                                *system,
                                Severity::Low,
                                FindingDetail::missing(
                                    "account_status",
                                    format!("unrecognized status '{}'", unknown.account_status),
                                ),
                            ));
                        }
                    }
                }
            }
        }

        Ok(outcome.finish())
    }
}
