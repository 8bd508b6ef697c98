//! Configuration validation for Access Warden.
//!
//! Catches configuration that would abort a review run, and points out
//! settings that are legal but probably not intended, before any extract is
//! read.

use crate::config::AppConfig;
use aw_core::SystemName;
use aw_ingest::SnapshotLoader;
use colored::Colorize;
use std::path::Path;

/// Grace periods above this many days are almost certainly a typo.
const MAX_REASONABLE_GRACE_DAYS: u32 = 365;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors that prevent a run.
    pub errors: Vec<String>,
    /// Warnings that should be addressed but don't prevent a run.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Merges another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration before a run.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the application configuration.
    ///
    /// Returns a ValidationResult containing any errors and warnings found.
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_inspection(config, &mut result);
        Self::validate_ingestion(config, &mut result);
        Self::validate_report(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    /// Checks that every required extract is present in `dir`.
    pub fn validate_input_dir(config: &AppConfig, dir: &Path) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !dir.is_dir() {
            result.add_warning(format!(
                "Input directory not found: {}. Runs against it will fail.",
                dir.display()
            ));
            return result;
        }

        // Pattern errors are already reported by validate().
        let Ok(loader) = SnapshotLoader::new(config.ingestion.clone()) else {
            return result;
        };

        for system in SystemName::ALL {
            let path = loader.extract_path(dir, system);
            if path.is_file() {
                continue;
            }
            if config.ingestion.is_optional(system) {
                result.add_warning(format!(
                    "Optional {} extract not found: {}. Its rules will skip it.",
                    system.label(),
                    path.display()
                ));
            } else {
                result.add_warning(format!(
                    "{} extract not found: {}. A run will fail until it is provided.",
                    system.label(),
                    path.display()
                ));
            }
        }

        result
    }

    fn validate_inspection(config: &AppConfig, result: &mut ValidationResult) {
        let inspection = &config.inspection;

        if let Err(e) = inspection.validate() {
            result.add_error(format!("inspection: {}", e));
        }

        for (name, days) in [
            ("joiner_grace_days", inspection.joiner_grace_days),
            ("leaver_grace_days", inspection.leaver_grace_days),
        ] {
            if days > MAX_REASONABLE_GRACE_DAYS {
                result.add_warning(format!(
                    "inspection.{} is {} days. Late provisioning and revocation will rarely be reported.",
                    name, days
                ));
            }
        }

        for system in &inspection.joiner_expected_systems {
            if config.ingestion.is_optional(*system) {
                result.add_warning(format!(
                    "{} is expected for joiners but its extract is optional. \
                     Joiners are not checked against it when the extract is absent.",
                    system.label()
                ));
            }
        }
    }

    fn validate_ingestion(config: &AppConfig, result: &mut ValidationResult) {
        let ingestion = &config.ingestion;

        if let Err(e) = ingestion.compile_patterns() {
            result.add_error(format!("ingestion: {}", e));
        }

        if ingestion.optional_systems.contains(&SystemName::HrSource) {
            result.add_warning(
                "ingestion.optional_systems lists hr_source. The HR extract is always required.",
            );
        }

        for (system, stem) in &ingestion.files {
            if stem.trim().is_empty() {
                result.add_warning(format!(
                    "ingestion.files.{} is empty. The default file name is used.",
                    system
                ));
            }
        }
    }

    fn validate_report(config: &AppConfig, result: &mut ValidationResult) {
        if let Err(e) = config.report.validate() {
            result.add_error(format!("report: {}", e));
        }

        let output_dir = &config.report.output_dir;
        if output_dir.exists() && !output_dir.is_dir() {
            result.add_error(format!(
                "report.output_dir '{}' exists and is not a directory",
                output_dir.display()
            ));
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        if config.logging.level.trim().parse::<tracing::Level>().is_err() {
            result.add_warning(format!(
                "Unknown log level '{}'. Falling back to info.",
                config.logging.level
            ));
        }
    }
}
