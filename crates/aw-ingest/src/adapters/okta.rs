//! Identity provider extract (Okta user report).

use super::{ExtractAdapter, ExtractRecord};
use crate::table::RowReader;
use aw_core::{AccountStatus, DateField, ItAccount, SystemName};

const EMAIL: &str = "user.email";
const CREATED: &str = "user.created";
const LAST_LOGIN: &str = "user.lastLogin";
const STATUS: &str = "user.status";

#[derive(Debug, Clone, Copy, Default)]
pub struct OktaAdapter;

impl ExtractAdapter for OktaAdapter {
    fn system(&self) -> SystemName {
        SystemName::IdentityProvider
    }

    fn default_stem(&self) -> &'static str {
        "okta"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[EMAIL, CREATED, LAST_LOGIN, STATUS]
    }

    fn read_row(&self, row: &mut RowReader<'_>) -> Option<ExtractRecord> {
        let key = row.identity(EMAIL)?;
        let status = AccountStatus::parse(row.text(STATUS).unwrap_or_default());

        let mut account = ItAccount::new(key, SystemName::IdentityProvider, status);
        account.account_created_date = row.date_into(
            CREATED,
            DateField::AccountCreatedDate,
            &mut account.unreadable_dates,
        );
        account.last_login_date =
            row.date_into(LAST_LOGIN, DateField::LastLoginDate, &mut account.unreadable_dates);

        Some(ExtractRecord::Account(account))
    }
}
