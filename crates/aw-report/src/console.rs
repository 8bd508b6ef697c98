//! Console summary of a report.

use aw_core::{RuleName, Severity, SystemName};
use aw_inspect::InspectionReport;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt;

/// Colored terminal summary: record counts, then one line per section.
///
/// Render it with `{}`; colors follow the `colored` crate's terminal
/// detection.
pub struct ConsoleSummary<'a> {
    report: &'a InspectionReport,
}

impl<'a> ConsoleSummary<'a> {
    pub fn new(report: &'a InspectionReport) -> Self {
        Self { report }
    }

    /// Finding counts by severity over successful sections.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.report.findings() {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for ConsoleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let snapshot = &report.snapshot;

        writeln!(f, "{}", "Records".bold())?;
        for system in SystemName::ALL {
            if snapshot.is_loaded(system) {
                writeln!(f, "  {:<22} {}", system.label(), snapshot.record_count(system))?;
            } else {
                writeln!(f, "  {:<22} {}", system.label(), "not loaded".yellow())?;
            }
        }
        let issues = snapshot.issues().len();
        if issues > 0 {
            writeln!(f, "  {:<22} {}", "Record issues", issues.to_string().yellow())?;
        }

        writeln!(f)?;
        writeln!(f, "{}", "Findings".bold())?;
        for rule in RuleName::ALL {
            match report.section(rule) {
                Some(Ok(outcome)) => {
                    let count = outcome.findings.len();
                    let count_text = if count == 0 {
                        "0 findings".green()
                    } else {
                        format!("{} findings", count).yellow()
                    };
                    writeln!(
                        f,
                        "  {} {:<22} {} ({} checked)",
                        "✓".green(),
                        rule.title(),
                        count_text,
                        outcome.checked
                    )?;
                }
                Some(Err(failure)) => {
                    writeln!(
                        f,
                        "  {} {:<22} {}",
                        "✗".red(),
                        rule.title(),
                        format!("failed: {}", failure.reason).red()
                    )?;
                }
                None => {}
            }
        }

        let counts = self.severity_counts();
        if !counts.is_empty() {
            let parts: Vec<String> = counts
                .iter()
                .rev()
                .map(|(severity, n)| format!("{} {}", severity, n))
                .collect();
            writeln!(f, "  {} {}", "By severity:".cyan(), parts.join(", "))?;
        }

        if let Err(failure) = &report.summaries {
            writeln!(f)?;
            writeln!(
                f,
                "  {} {}",
                "✗".red(),
                format!("summary tables failed: {}", failure.reason).red()
            )?;
        }

        Ok(())
    }
}
