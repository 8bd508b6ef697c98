//! Configuration loading for the Access Warden CLI.

use anyhow::{bail, Context, Result};
use aw_ingest::IngestionConfig;
use aw_inspect::InspectionConfig;
use aw_report::ReportConfig;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rule evaluation settings.
    #[serde(default)]
    pub inspection: InspectionConfig,

    /// Extract locations and parsing settings.
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Loads configuration from a file.
    ///
    /// `${VAR}` references are replaced from the environment before parsing.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let contents = substitute_env_vars(contents)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// A path given explicitly on the command line must exist.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if path.exists() || explicit {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file.
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

/// Replaces `${VAR}` references with environment values.
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing = Vec::new();
    let output = ENV_VAR.replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        env::var(name).unwrap_or_else(|_| {
            missing.push(name.to_string());
            String::new()
        })
    });

    if !missing.is_empty() {
        bail!("Environment variables not set: {}", missing.join(", "));
    }

    Ok(output.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::SystemName;
    use aw_ingest::DateOrder;
    use aw_inspect::ReviewPeriod;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.inspection.joiner_grace_days, 0);
        assert_eq!(config.inspection.leaver_grace_days, 0);
        assert_eq!(config.inspection.review_period, ReviewPeriod::All);
        assert_eq!(config.report.date_format, "%d-%m-%Y");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
inspection:
  joiner_grace_days: 7
  leaver_grace_days: 3
  review_period: financial_year
  financial_year_start_month: 4
  joiner_expected_systems: [identity_provider, chat_platform]
  parallel_evaluators: true

ingestion:
  files:
    hr_source: hr_export
  optional_systems: [productivity_suite]
  date_order: month_first

report:
  output_dir: out/reports
  write_record_sheets: false

logging:
  level: debug
  json_format: true
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.inspection.joiner_grace_days, 7);
        assert_eq!(config.inspection.review_period, ReviewPeriod::FinancialYear);
        assert_eq!(config.inspection.joiner_expected_systems.len(), 2);
        assert!(config.inspection.parallel_evaluators);
        assert_eq!(config.ingestion.file_stem(SystemName::HrSource), Some("hr_export"));
        assert!(config.ingestion.is_optional(SystemName::ProductivitySuite));
        assert_eq!(config.ingestion.date_order, DateOrder::MonthFirst);
        assert!(!config.report.write_record_sheets);
        assert_eq!(config.report.date_format, "%d-%m-%Y");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("inspection:\n  leaver_grace_days: 14\n").unwrap();
        assert_eq!(config.inspection.leaver_grace_days, 14);
        assert_eq!(config.ingestion, IngestionConfig::default());
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_env_substitution() {
        env::set_var("AW_TEST_REPORT_DIR", "/tmp/aw-reports");
        let config =
            AppConfig::from_yaml("report:\n  output_dir: ${AW_TEST_REPORT_DIR}\n").unwrap();
        assert_eq!(
            config.report.output_dir,
            std::path::PathBuf::from("/tmp/aw-reports")
        );
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let err = AppConfig::from_yaml("report:\n  output_dir: ${AW_TEST_UNSET_VARIABLE}\n")
            .unwrap_err();
        assert!(err.to_string().contains("AW_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn test_unknown_system_is_rejected() {
        let yaml = "ingestion:\n  optional_systems: [mainframe]\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = AppConfig::default();
        config.inspection.joiner_grace_days = 10;
        config.ingestion.optional_systems = vec![SystemName::ChatPlatform];
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.yaml");

        assert_eq!(
            AppConfig::load_or_default(&missing, false).unwrap(),
            AppConfig::default()
        );
        assert!(AppConfig::load_or_default(&missing, true).is_err());
    }
}
