//! Idle rule: active accounts without recent sign-ins.

use super::{EvaluationContext, EvaluationError, Rule, RuleOutcome};
use aw_core::{DateField, Finding, FindingDetail, IdleBucket, RuleName, Severity};

/// Buckets active accounts by days since last login.
///
/// Accounts whose last login could not be read are left to the data-quality
/// section.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleRule;

impl IdleRule {
    fn severity(bucket: IdleBucket) -> Severity {
        match bucket {
            IdleBucket::Days45 => Severity::Low,
            IdleBucket::Days90 => Severity::Medium,
            IdleBucket::Days120 => Severity::High,
        }
    }
}

impl Rule for IdleRule {
    fn name(&self) -> RuleName {
        RuleName::Idle
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<RuleOutcome, EvaluationError> {
        let mut outcome = RuleOutcome::new(RuleName::Idle);

        for account in ctx.snapshot.all_accounts() {
            if !account.account_status.is_active()
                || account.is_unreadable(DateField::LastLoginDate)
            {
                continue;
            }
            outcome.record_checked();

            let Some(last_login_date) = account.last_login_date else {
                outcome.push(Finding::new(
                    RuleName::Idle,
                    account.identity_key.clone(),
                    account.system,
                    Severity::Medium,
                    FindingDetail::NeverActive {
                        account_created_date: account.account_created_date,
                    },
                ));
                continue;
            };

            let days_idle = (ctx.run_date - last_login_date).num_days();
            if days_idle < 0 {
                outcome.push(Finding::new(
                    RuleName::Idle,
                    account.identity_key.clone(),
                    account.system,
                    Severity::Low,
                    FindingDetail::InvalidValue {
                        field: "last_login_date".to_string(),
                        raw_value: last_login_date.to_string(),
                        reason: "last login is after the run date".to_string(),
                    },
                ));
                continue;
            }

            if let Some(bucket) = IdleBucket::from_days(days_idle) {
                outcome.push(Finding::new(
                    RuleName::Idle,
                    account.identity_key.clone(),
                    account.system,
                    Self::severity(bucket),
                    FindingDetail::Idle {
                        bucket,
                        last_login_date,
                        days_idle,
                    },
                ));
            }
        }

        Ok(outcome.finish())
    }
}
