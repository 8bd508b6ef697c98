//! Findings produced by rule evaluators.
//!
//! A [`Finding`] is an immutable observation about one identity in one
//! system. Compliance verdicts and data-quality observations share the type
//! but are told apart by [`FindingDetail::is_data_quality`].

use crate::identity::IdentityKey;
use crate::records::{AccountStatus, EmploymentStatus};
use crate::system::SystemName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action expected.
    Info,
    /// Review when convenient.
    Low,
    /// Investigate.
    Medium,
    /// Act on it.
    High,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
    ];

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    /// Joiner provisioning timing.
    Joiner,
    /// Leaver de-provisioning timing.
    Leaver,
    /// Idle account aging.
    Idle,
    /// Untracked system accounts.
    SystemUser,
    /// Values rejected during ingestion.
    DataQuality,
}

impl RuleName {
    /// Every rule, in report order.
    pub const ALL: [RuleName; 5] = [
        RuleName::Joiner,
        RuleName::Leaver,
        RuleName::Idle,
        RuleName::SystemUser,
        RuleName::DataQuality,
    ];

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Joiner => "joiner",
            RuleName::Leaver => "leaver",
            RuleName::Idle => "idle",
            RuleName::SystemUser => "system_user",
            RuleName::DataQuality => "data_quality",
        }
    }

    /// Returns the report section title.
    pub fn title(&self) -> &'static str {
        match self {
            RuleName::Joiner => "New Joiner Access",
            RuleName::Leaver => "Leaver Access",
            RuleName::Idle => "Idle Users",
            RuleName::SystemUser => "System Users",
            RuleName::DataQuality => "Data Quality",
        }
    }

    /// Returns what the rule checks.
    pub fn description(&self) -> &'static str {
        match self {
            RuleName::Joiner => "whether new joiners got access on time, not before joining",
            RuleName::Leaver => {
                "whether leavers retained access after their last working day or signed in after it"
            }
            RuleName::Idle => "whether active accounts have gone unused for 45, 90 or 120 days",
            RuleName::SystemUser => "whether IT system accounts are tracked in HR records",
            RuleName::DataQuality => "values in the extracts that could not be normalized",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idle-age bucket. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdleBucket {
    /// 45 to 89 days.
    #[serde(rename = "45")]
    Days45,
    /// 90 to 119 days.
    #[serde(rename = "90")]
    Days90,
    /// 120 days or more.
    #[serde(rename = "120")]
    Days120,
}

impl IdleBucket {
    /// Buckets from lowest threshold to highest.
    pub const ALL: [IdleBucket; 3] = [IdleBucket::Days45, IdleBucket::Days90, IdleBucket::Days120];

    /// Returns the bucket for an idle age, or `None` below 45 days.
    pub fn from_days(days_idle: i64) -> Option<Self> {
        match days_idle {
            d if d >= 120 => Some(IdleBucket::Days120),
            d if d >= 90 => Some(IdleBucket::Days90),
            d if d >= 45 => Some(IdleBucket::Days45),
            _ => None,
        }
    }

    /// Inclusive lower bound in days.
    pub fn threshold(&self) -> i64 {
        match self {
            IdleBucket::Days45 => 45,
            IdleBucket::Days90 => 90,
            IdleBucket::Days120 => 120,
        }
    }
}

impl fmt::Display for IdleBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.threshold())
    }
}

/// Rule-specific details of a finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetail {
    /// Joiner has no account in an expected system.
    NoAccountProvisioned { join_date: NaiveDate },
    /// Account was created after the joining date plus grace.
    LateProvisioning {
        join_date: NaiveDate,
        created_date: NaiveDate,
        days_late: i64,
    },
    /// Account was created before the joining date.
    EarlyProvisioning {
        join_date: NaiveDate,
        created_date: NaiveDate,
        days_early: i64,
    },
    /// Leaver still holds an account past the grace window.
    AccessNotRevoked {
        exit_date: NaiveDate,
        account_status: AccountStatus,
        days_since_exit: i64,
    },
    /// Account was used after the exit date.
    LoginAfterExit {
        exit_date: NaiveDate,
        last_login_date: NaiveDate,
        days_after_exit: i64,
    },
    /// Active account unused for at least 45 days.
    Idle {
        bucket: IdleBucket,
        last_login_date: NaiveDate,
        days_idle: i64,
    },
    /// Active account that has never been signed into.
    NeverActive {
        account_created_date: Option<NaiveDate>,
    },
    /// Account not tracked in HR or marked as a service account.
    UntrackedAccount {
        is_system_account: bool,
        tracked_in_hr: bool,
        human_format: bool,
        account_status: AccountStatus,
    },
    /// A value the rule needs is absent or ambiguous.
    MissingData { field: String, reason: String },
    /// HR marks the employee terminated but has no exit date.
    MissingExitDate { employment_status: EmploymentStatus },
    /// Ingestion could not normalize a value.
    InvalidValue {
        field: String,
        raw_value: String,
        reason: String,
    },
}

impl FindingDetail {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            FindingDetail::NoAccountProvisioned { .. } => "no account provisioned",
            FindingDetail::LateProvisioning { .. } => "late provisioning",
            FindingDetail::EarlyProvisioning { .. } => "early provisioning",
            FindingDetail::AccessNotRevoked { .. } => "access not revoked",
            FindingDetail::LoginAfterExit { .. } => "login after exit",
            FindingDetail::Idle { .. } => "idle account",
            FindingDetail::NeverActive { .. } => "never active",
            FindingDetail::UntrackedAccount { .. } => "untracked system/service account",
            FindingDetail::MissingData { .. } => "missing data",
            FindingDetail::MissingExitDate { .. } => "missing exit date",
            FindingDetail::InvalidValue { .. } => "invalid value",
        }
    }

    /// Returns true for observations about input quality rather than compliance.
    pub fn is_data_quality(&self) -> bool {
        matches!(
            self,
            FindingDetail::MissingData { .. }
                | FindingDetail::MissingExitDate { .. }
                | FindingDetail::InvalidValue { .. }
        )
    }

    /// Builds a missing-data detail.
    pub fn missing(field: &str, reason: impl Into<String>) -> Self {
        FindingDetail::MissingData {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single compliance or data-quality observation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that produced the finding.
    pub rule: RuleName,
    /// Identity the finding is about.
    pub identity_key: IdentityKey,
    /// System the finding concerns.
    pub system: SystemName,
    /// Rule-specific details.
    pub detail: FindingDetail,
    /// Severity.
    pub severity: Severity,
}

impl Finding {
    /// Creates a finding.
    pub fn new(
        rule: RuleName,
        identity_key: IdentityKey,
        system: SystemName,
        severity: Severity,
        detail: FindingDetail,
    ) -> Self {
        Self {
            rule,
            identity_key,
            system,
            detail,
            severity,
        }
    }

    /// Returns true for data-quality findings.
    pub fn is_data_quality(&self) -> bool {
        self.detail.is_data_quality()
    }
}
