//! Ingestion settings.

use crate::error::IngestError;
use aw_core::SystemName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to read dates like `03/04/2024`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `dd/mm/yyyy` wins when both readings are valid.
    #[default]
    DayFirst,
    /// `mm/dd/yyyy` wins when both readings are valid.
    MonthFirst,
}

/// Settings for locating and reading extracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// File stems overriding each adapter's default (`<stem>.csv`).
    #[serde(default)]
    pub files: BTreeMap<SystemName, String>,

    /// IT systems whose extract may be absent.
    #[serde(default)]
    pub optional_systems: Vec<SystemName>,

    /// Regexes matched against identity keys to mark service accounts.
    #[serde(default = "default_service_account_patterns")]
    pub service_account_patterns: Vec<String>,

    /// Preferred reading of ambiguous numeric dates.
    #[serde(default)]
    pub date_order: DateOrder,
}

fn default_service_account_patterns() -> Vec<String> {
    vec![
        r"^(svc|service|sys|system|bot|api|integration|automation)[-_.]".to_string(),
        r"^(no-?reply|donotreply|do-not-reply)@".to_string(),
    ]
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            optional_systems: Vec::new(),
            service_account_patterns: default_service_account_patterns(),
            date_order: DateOrder::default(),
        }
    }
}

impl IngestionConfig {
    /// Returns true if a missing extract for `system` is tolerated.
    ///
    /// The HR extract is always required.
    pub fn is_optional(&self, system: SystemName) -> bool {
        system.is_it_system() && self.optional_systems.contains(&system)
    }

    /// File stem configured for `system`, if overridden.
    pub fn file_stem(&self, system: SystemName) -> Option<&str> {
        self.files
            .get(&system)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Compiles the service account patterns.
    pub fn compile_patterns(&self) -> Result<Vec<Regex>, IngestError> {
        self.service_account_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| IngestError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestionConfig::default();
        assert_eq!(config.date_order, DateOrder::DayFirst);
        assert!(config.files.is_empty());
        assert_eq!(config.compile_patterns().unwrap().len(), 2);
    }

    #[test]
    fn test_hr_never_optional() {
        let config = IngestionConfig {
            optional_systems: vec![SystemName::HrSource, SystemName::ChatPlatform],
            ..Default::default()
        };
        assert!(!config.is_optional(SystemName::HrSource));
        assert!(config.is_optional(SystemName::ChatPlatform));
        assert!(!config.is_optional(SystemName::IdentityProvider));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = IngestionConfig {
            service_account_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.compile_patterns(),
            Err(IngestError::Pattern { .. })
        ));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
files:
  hr_source: hr_export
  chat_platform: ""
optional_systems: [productivity_suite]
date_order: month_first
"#;
        let config: IngestionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.file_stem(SystemName::HrSource), Some("hr_export"));
        assert_eq!(config.file_stem(SystemName::ChatPlatform), None);
        assert_eq!(config.date_order, DateOrder::MonthFirst);
        assert_eq!(config.service_account_patterns.len(), 2);
    }
}
