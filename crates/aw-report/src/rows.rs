//! Flat row types for the CSV sheets.
//!
//! Every sheet is written through `serde`, so each struct's field order is
//! its column order.

use aw_core::{Finding, FindingDetail, HrRecord, ItAccount, SummaryRow};
use chrono::NaiveDate;
use serde::Serialize;

fn format_date(date: Option<NaiveDate>, format: &str) -> String {
    date.map(|d| d.format(format).to_string()).unwrap_or_default()
}

/// One line of `summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCsvRow {
    pub table: String,
    pub category: String,
    pub metric: String,
    pub value: String,
}

impl SummaryCsvRow {
    pub fn from_row(table: &str, row: &SummaryRow) -> Self {
        Self {
            table: table.to_string(),
            category: row.category.to_string(),
            metric: row.metric.clone(),
            value: row.value.to_string(),
        }
    }
}

/// One line of a `findings_<rule>.csv` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingRow {
    pub identity_key: String,
    pub system: String,
    pub severity: String,
    pub finding: String,
    /// Joining or exit date the finding is measured from.
    pub reference_date: String,
    /// Creation or last login date observed in the extract.
    pub observed_date: String,
    pub days: Option<i64>,
    pub bucket: String,
    pub account_status: String,
    pub field: String,
    pub value: String,
    pub note: String,
}

impl FindingRow {
    pub fn from_finding(finding: &Finding, date_format: &str) -> Self {
        let date = |d: NaiveDate| format_date(Some(d), date_format);
        let mut row = Self {
            identity_key: finding.identity_key.to_string(),
            system: finding.system.label().to_string(),
            severity: finding.severity.to_string(),
            finding: finding.detail.label().to_string(),
            reference_date: String::new(),
            observed_date: String::new(),
            days: None,
            bucket: String::new(),
            account_status: String::new(),
            field: String::new(),
            value: String::new(),
            note: String::new(),
        };

        match &finding.detail {
            FindingDetail::NoAccountProvisioned { join_date } => {
                row.reference_date = date(*join_date);
            }
            FindingDetail::LateProvisioning {
                join_date,
                created_date,
                days_late,
            } => {
                row.reference_date = date(*join_date);
                row.observed_date = date(*created_date);
                row.days = Some(*days_late);
            }
            FindingDetail::EarlyProvisioning {
                join_date,
                created_date,
                days_early,
            } => {
                row.reference_date = date(*join_date);
                row.observed_date = date(*created_date);
                row.days = Some(*days_early);
            }
            FindingDetail::AccessNotRevoked {
                exit_date,
                account_status,
                days_since_exit,
            } => {
                row.reference_date = date(*exit_date);
                row.days = Some(*days_since_exit);
                row.account_status = account_status.to_string();
            }
            FindingDetail::LoginAfterExit {
                exit_date,
                last_login_date,
                days_after_exit,
            } => {
                row.reference_date = date(*exit_date);
                row.observed_date = date(*last_login_date);
                row.days = Some(*days_after_exit);
            }
            FindingDetail::Idle {
                bucket,
                last_login_date,
                days_idle,
            } => {
                row.observed_date = date(*last_login_date);
                row.days = Some(*days_idle);
                row.bucket = bucket.to_string();
            }
            FindingDetail::NeverActive {
                account_created_date,
            } => {
                row.reference_date = format_date(*account_created_date, date_format);
            }
            FindingDetail::UntrackedAccount {
                is_system_account,
                tracked_in_hr,
                human_format,
                account_status,
            } => {
                row.account_status = account_status.to_string();
                row.note = format!(
                    "system account: {}, in HR: {}, name format: {}",
                    yes_no(*is_system_account),
                    yes_no(*tracked_in_hr),
                    if *human_format { "human" } else { "system" }
                );
            }
            FindingDetail::MissingData { field, reason } => {
                row.field = field.clone();
                row.note = reason.clone();
            }
            FindingDetail::MissingExitDate { employment_status } => {
                row.field = "exit_date".to_string();
                row.note = format!("employment status is {}", employment_status);
            }
            FindingDetail::InvalidValue {
                field,
                raw_value,
                reason,
            } => {
                row.field = field.clone();
                row.value = raw_value.clone();
                row.note = reason.clone();
            }
        }
        row
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// One line of `records_hr_source.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HrRow {
    pub identity_key: String,
    pub join_date: String,
    pub exit_date: String,
    pub employment_status: String,
    pub employee_type: String,
}

impl HrRow {
    pub fn from_record(record: &HrRecord, date_format: &str) -> Self {
        Self {
            identity_key: record.identity_key.to_string(),
            join_date: format_date(record.join_date, date_format),
            exit_date: format_date(record.exit_date, date_format),
            employment_status: record.employment_status.to_string(),
            employee_type: record.employee_type.clone().unwrap_or_default(),
        }
    }
}

/// One line of a `records_<system>.csv` sheet for an IT system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRow {
    pub identity_key: String,
    pub account_created_date: String,
    pub last_login_date: String,
    pub account_status: String,
    pub is_system_account: bool,
}

impl AccountRow {
    pub fn from_account(account: &ItAccount, date_format: &str) -> Self {
        Self {
            identity_key: account.identity_key.to_string(),
            account_created_date: format_date(account.account_created_date, date_format),
            last_login_date: format_date(account.last_login_date, date_format),
            account_status: account.account_status.to_string(),
            is_system_account: account.is_system_account,
        }
    }
}
