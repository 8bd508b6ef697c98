//! Inspection settings.
//!
//! Grace periods and the review window are policy decisions rather than
//! constants, so they are read from the `inspection` section of the
//! application configuration.

use aw_core::SystemName;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in the inspection configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Which joiners and leavers a run looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPeriod {
    /// Every joiner and leaver in the HR extract.
    #[default]
    All,
    /// Only those whose joining/exit date falls in the current financial year.
    FinancialYear,
}

/// Settings for the rule evaluators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionConfig {
    /// Days an account may be created after joining before it counts as late.
    #[serde(default)]
    pub joiner_grace_days: u32,

    /// Days an account may stay enabled after exit before it counts as not revoked.
    #[serde(default)]
    pub leaver_grace_days: u32,

    /// Which joiners and leavers to examine.
    #[serde(default)]
    pub review_period: ReviewPeriod,

    /// First month (1-12) of the financial year.
    #[serde(default = "default_financial_year_start_month")]
    pub financial_year_start_month: u32,

    /// Systems every joiner is expected to have an account in.
    #[serde(default = "default_joiner_expected_systems")]
    pub joiner_expected_systems: Vec<SystemName>,

    /// Run evaluators concurrently on the blocking thread pool.
    #[serde(default)]
    pub parallel_evaluators: bool,
}

fn default_financial_year_start_month() -> u32 {
    4
}

fn default_joiner_expected_systems() -> Vec<SystemName> {
    SystemName::IT_SYSTEMS.to_vec()
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            joiner_grace_days: 0,
            leaver_grace_days: 0,
            review_period: ReviewPeriod::default(),
            financial_year_start_month: default_financial_year_start_month(),
            joiner_expected_systems: default_joiner_expected_systems(),
            parallel_evaluators: false,
        }
    }
}

impl InspectionConfig {
    /// Checks values serde cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=12).contains(&self.financial_year_start_month) {
            return Err(ConfigError::InvalidValue(format!(
                "financial_year_start_month must be 1-12, got {}",
                self.financial_year_start_month
            )));
        }
        if self.joiner_expected_systems.is_empty() {
            return Err(ConfigError::MissingField(
                "joiner_expected_systems".to_string(),
            ));
        }
        if let Some(hr) = self
            .joiner_expected_systems
            .iter()
            .find(|s| !s.is_it_system())
        {
            return Err(ConfigError::InvalidValue(format!(
                "joiner_expected_systems may only list IT systems, found {}",
                hr
            )));
        }
        Ok(())
    }

    /// First day of the financial year containing `run_date`.
    pub fn financial_year_start(&self, run_date: NaiveDate) -> NaiveDate {
        let month = self.financial_year_start_month.clamp(1, 12);
        let year = if run_date.month() < month {
            run_date.year() - 1
        } else {
            run_date.year()
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(run_date)
    }

    /// Earliest joining/exit date a run examines, if the period is bounded.
    pub fn period_start(&self, run_date: NaiveDate) -> Option<NaiveDate> {
        match self.review_period {
            ReviewPeriod::All => None,
            ReviewPeriod::FinancialYear => Some(self.financial_year_start(run_date)),
        }
    }
}
