//! Chat platform extract (Slack member export).

use super::{ExtractAdapter, ExtractRecord};
use crate::table::RowReader;
use aw_core::{AccountStatus, DateField, ItAccount, SystemName};

const EMAIL: &str = "Email";
const CREATED: &str = "Account created (UTC)";
const LAST_ACTIVE: &str = "Last active (UTC)";
const DEACTIVATED: &str = "Deactivated date (UTC)";
const ACCOUNT_TYPE: &str = "Account type";

/// Optional columns keying integrations that have no e-mail address.
const FALLBACK_KEYS: [&str; 2] = ["User ID", "Username"];

/// Account types that belong to integrations rather than people.
const NON_HUMAN_TYPES: [&str; 3] = ["bot", "app", "workflow"];

/// The export has no status column: an account is deactivated when it has a
/// deactivation date or its type says so. An unparseable deactivation date
/// leaves the status unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlackAdapter;

impl ExtractAdapter for SlackAdapter {
    fn system(&self) -> SystemName {
        SystemName::ChatPlatform
    }

    fn default_stem(&self) -> &'static str {
        "slack"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[EMAIL, CREATED, LAST_ACTIVE, DEACTIVATED, ACCOUNT_TYPE]
    }

    fn read_row(&self, row: &mut RowReader<'_>) -> Option<ExtractRecord> {
        let account_type = row.text(ACCOUNT_TYPE).unwrap_or_default().to_lowercase();
        let is_system_account = NON_HUMAN_TYPES.contains(&account_type.as_str());

        let fallback = if is_system_account && row.text(EMAIL).is_none() {
            FALLBACK_KEYS.into_iter().find(|column| row.text(column).is_some())
        } else {
            None
        };
        let key = row.identity(fallback.unwrap_or(EMAIL))?;

        let deactivated = row.read_date(DEACTIVATED);
        let status = if deactivated.value().is_some() || account_type == "deactivated" {
            AccountStatus::Deactivated
        } else if deactivated.is_unreadable() {
            AccountStatus::Unknown(row.text(DEACTIVATED).unwrap_or_default().to_string())
        } else {
            AccountStatus::Active
        };

        let mut account = ItAccount::new(key, SystemName::ChatPlatform, status);
        account.account_created_date = row.date_into(
            CREATED,
            DateField::AccountCreatedDate,
            &mut account.unreadable_dates,
        );
        account.last_login_date = row.date_into(
            LAST_ACTIVE,
            DateField::LastLoginDate,
            &mut account.unreadable_dates,
        );
        account.is_system_account = is_system_account;

        Some(ExtractRecord::Account(account))
    }
}
