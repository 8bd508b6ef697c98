//! System-user rule: accounts that HR does not know about.

use super::{EvaluationContext, EvaluationError, Rule, RuleOutcome};
use aw_core::{Finding, FindingDetail, RuleName, Severity};

/// Reports service accounts and accounts with no matching HR record.
///
/// An account that is both gets exactly one finding.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUserRule;

impl Rule for SystemUserRule {
    fn name(&self) -> RuleName {
        RuleName::SystemUser
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError> {
        let mut outcome = RuleOutcome::new(RuleName::SystemUser);
        let hr_identities = ctx.snapshot.hr_identities();

        for account in ctx.snapshot.all_accounts() {
            outcome.record_checked();

            let tracked_in_hr = hr_identities.contains(&account.identity_key);
            if tracked_in_hr && !account.is_system_account {
                continue;
            }

            let human_format = account.identity_key.is_human_format();
            let severity = match (account.account_status.is_active(), human_format) {
                (true, true) => Severity::Medium,
                (true, false) => Severity::Low,
                (false, _) => Severity::Info,
            };

            outcome.push(Finding::new(
                RuleName::SystemUser,
                account.identity_key.clone(),
                account.system,
                severity,
                FindingDetail::UntrackedAccount {
                    is_system_account: account.is_system_account,
                    tracked_in_hr,
                    human_format,
                    account_status: account.account_status.clone(),
                },
            ));
        }

        Ok(outcome.finish())
    }
}
