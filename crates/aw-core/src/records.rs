//! Normalized HR records and IT accounts.

use crate::identity::IdentityKey;
use crate::system::SystemName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Date fields of a record.
///
/// Ingestion marks a field unreadable when the extract held a value that
/// could not be parsed, so rules can tell it apart from an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    JoinDate,
    ExitDate,
    AccountCreatedDate,
    LastLoginDate,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::JoinDate => "join_date",
            DateField::ExitDate => "exit_date",
            DateField::AccountCreatedDate => "account_created_date",
            DateField::LastLoginDate => "last_login_date",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employment status as reported by the HR source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Currently employed, including probation and notice period.
    Active,
    /// Offer accepted, not yet joined.
    Pending,
    /// Employment has ended.
    Terminated,
    /// Any status the review does not recognise.
    Other(String),
}

impl EmploymentStatus {
    /// Parses HR status text case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "active" | "confirmed" | "probation" | "on probation" | "employed" | "current"
            | "notice period" | "serving notice" => EmploymentStatus::Active,
            "pending" | "offer accepted" | "pre joining" | "onboarding" | "yet to join" => {
                EmploymentStatus::Pending
            }
            "terminated" | "inactive" | "exited" | "resigned" | "relieved" | "separated"
            | "left" | "absconded" => EmploymentStatus::Terminated,
            _ => EmploymentStatus::Other(raw.trim().to_string()),
        }
    }

    /// Returns true once employment has ended.
    pub fn is_terminated(&self) -> bool {
        matches!(self, EmploymentStatus::Terminated)
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmploymentStatus::Active => write!(f, "active"),
            EmploymentStatus::Pending => write!(f, "pending"),
            EmploymentStatus::Terminated => write!(f, "terminated"),
            EmploymentStatus::Other(raw) if raw.is_empty() => write!(f, "unspecified"),
            EmploymentStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Status of an account in an IT system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account can sign in.
    Active,
    /// Account is locked out but not revoked.
    Locked,
    /// Account exists but has not been activated yet.
    Pending,
    /// Account is suspended.
    Suspended,
    /// Account is deactivated.
    Deactivated,
    /// Account has been deprovisioned or deleted.
    Deprovisioned,
    /// Status text the review does not recognise.
    Unknown(String),
}

impl AccountStatus {
    /// Parses account status text case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "active" | "enabled" | "recovery" | "password_expired" => AccountStatus::Active,
            "locked" | "locked_out" => AccountStatus::Locked,
            "staged" | "provisioned" | "pending" | "invited" => AccountStatus::Pending,
            "suspended" => AccountStatus::Suspended,
            "deactivated" | "disabled" | "inactive" => AccountStatus::Deactivated,
            "deprovisioned" | "deleted" | "archived" => AccountStatus::Deprovisioned,
            _ => AccountStatus::Unknown(raw.trim().to_string()),
        }
    }

    /// Returns true only for accounts that can currently sign in.
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Returns true when access has been taken away.
    pub fn is_revoked(&self) -> bool {
        matches!(
            self,
            AccountStatus::Suspended | AccountStatus::Deactivated | AccountStatus::Deprovisioned
        )
    }

    /// Returns true when the status cannot be interpreted.
    pub fn is_unknown(&self) -> bool {
        matches!(self, AccountStatus::Unknown(_))
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Locked => write!(f, "locked"),
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Suspended => write!(f, "suspended"),
            AccountStatus::Deactivated => write!(f, "deactivated"),
            AccountStatus::Deprovisioned => write!(f, "deprovisioned"),
            AccountStatus::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            AccountStatus::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

/// One employee row from the HR extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrRecord {
    /// Official identity key of the employee.
    pub identity_key: IdentityKey,
    /// Date of joining.
    pub join_date: Option<NaiveDate>,
    /// Last working day.
    pub exit_date: Option<NaiveDate>,
    /// Employment status.
    pub employment_status: EmploymentStatus,
    /// Employee type (full time, contractor, intern...).
    pub employee_type: Option<String>,
    /// Dates whose extract value could not be parsed.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unreadable_dates: BTreeSet<DateField>,
}

impl HrRecord {
    /// Creates an HR record with no dates.
    pub fn new(identity_key: IdentityKey, employment_status: EmploymentStatus) -> Self {
        Self {
            identity_key,
            join_date: None,
            exit_date: None,
            employment_status,
            employee_type: None,
            unreadable_dates: BTreeSet::new(),
        }
    }

    /// Sets the joining date.
    pub fn with_join_date(mut self, date: NaiveDate) -> Self {
        self.join_date = Some(date);
        self
    }

    /// Sets the exit date.
    pub fn with_exit_date(mut self, date: NaiveDate) -> Self {
        self.exit_date = Some(date);
        self
    }

    /// Sets the employee type.
    pub fn with_employee_type(mut self, employee_type: &str) -> Self {
        self.employee_type = Some(employee_type.to_string());
        self
    }

    /// Marks a date as present in the extract but unparseable.
    pub fn with_unreadable(mut self, field: DateField) -> Self {
        self.unreadable_dates.insert(field);
        self
    }

    /// Returns true if the extract value for `field` could not be parsed.
    pub fn is_unreadable(&self, field: DateField) -> bool {
        self.unreadable_dates.contains(&field)
    }

    /// Returns true if the employee had left strictly before `date`.
    pub fn exited_before(&self, date: NaiveDate) -> bool {
        self.exit_date.is_some_and(|exit| exit < date)
    }
}

/// One account row from an IT-system extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItAccount {
    /// Identity key the account is registered under.
    pub identity_key: IdentityKey,
    /// System holding the account.
    pub system: SystemName,
    /// When the account was created.
    pub account_created_date: Option<NaiveDate>,
    /// Most recent sign-in.
    pub last_login_date: Option<NaiveDate>,
    /// Current status.
    pub account_status: AccountStatus,
    /// Whether the extract (or a service-account pattern) marks this as non-human.
    pub is_system_account: bool,
    /// Dates whose extract value could not be parsed.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unreadable_dates: BTreeSet<DateField>,
}

impl ItAccount {
    /// Creates an account with no dates.
    pub fn new(identity_key: IdentityKey, system: SystemName, account_status: AccountStatus) -> Self {
        Self {
            identity_key,
            system,
            account_created_date: None,
            last_login_date: None,
            account_status,
            is_system_account: false,
            unreadable_dates: BTreeSet::new(),
        }
    }

    /// Sets the creation date.
    pub fn with_created_date(mut self, date: NaiveDate) -> Self {
        self.account_created_date = Some(date);
        self
    }

    /// Sets the last sign-in date.
    pub fn with_last_login(mut self, date: NaiveDate) -> Self {
        self.last_login_date = Some(date);
        self
    }

    /// Marks the account as a system/service account.
    pub fn as_system_account(mut self) -> Self {
        self.is_system_account = true;
        self
    }

    /// Marks a date as present in the extract but unparseable.
    pub fn with_unreadable(mut self, field: DateField) -> Self {
        self.unreadable_dates.insert(field);
        self
    }

    /// Returns true if the extract value for `field` could not be parsed.
    pub fn is_unreadable(&self, field: DateField) -> bool {
        self.unreadable_dates.contains(&field)
    }
}
