//! Productivity suite extract (Google Workspace user download).

use super::{ExtractAdapter, ExtractRecord};
use crate::table::RowReader;
use aw_core::{AccountStatus, DateField, ItAccount, SystemName};

const EMAIL: &str = "Email Address [Required]";
const LAST_SIGN_IN: &str = "Last Sign In [READ ONLY]";
const STATUS: &str = "Status [READ ONLY]";
/// Not part of the default download; read when present.
const CREATED: &str = "Created [READ ONLY]";

#[derive(Debug, Clone, Copy, Default)]
pub struct GwsAdapter;

impl ExtractAdapter for GwsAdapter {
    fn system(&self) -> SystemName {
        SystemName::ProductivitySuite
    }

    fn default_stem(&self) -> &'static str {
        "gws"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[EMAIL, LAST_SIGN_IN, STATUS]
    }

    fn read_row(&self, row: &mut RowReader<'_>) -> Option<ExtractRecord> {
        let key = row.identity(EMAIL)?;
        let status = AccountStatus::parse(row.text(STATUS).unwrap_or_default());

        let mut account = ItAccount::new(key, SystemName::ProductivitySuite, status);
        account.account_created_date = row.date_into(
            CREATED,
            DateField::AccountCreatedDate,
            &mut account.unreadable_dates,
        );
        account.last_login_date = row.date_into(
            LAST_SIGN_IN,
            DateField::LastLoginDate,
            &mut account.unreadable_dates,
        );

        Some(ExtractRecord::Account(account))
    }
}
