//! Report output settings.

use crate::error::ReportError;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the `report` section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// `strftime` format for dates in CSV sheets.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Write `records_<system>.csv` detail sheets.
    #[serde(default = "default_true")]
    pub write_record_sheets: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_date_format() -> String {
    "%d-%m-%Y".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            date_format: default_date_format(),
            write_record_sheets: true,
        }
    }
}

impl ReportConfig {
    /// Rejects date formats chrono cannot render.
    pub fn validate(&self) -> Result<(), ReportError> {
        let invalid = self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(ReportError::InvalidDateFormat(self.date_format.clone()));
        }
        Ok(())
    }
}
