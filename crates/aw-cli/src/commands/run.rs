//! Run command - loads extracts, inspects them and writes the report.

use anyhow::{Context, Result};
use aw_core::SystemName;
use aw_ingest::SnapshotLoader;
use aw_inspect::{InspectionReport, Inspector};
use aw_report::{ConsoleSummary, ReportWriter, WrittenReport};
use chrono::NaiveDate;
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::OutputFormat;

/// Run settings from CLI arguments.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the extracts.
    pub input_dir: PathBuf,
    /// Overrides `report.output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Date the review is run as of.
    pub run_date: NaiveDate,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: InspectionReport,
    pub written: WrittenReport,
}

/// Runs one review end to end.
///
/// Ingestion and configuration errors abort the run. A rule that fails
/// only removes its own section; the rest of the report is still written.
pub async fn run_review(config: &AppConfig, options: &RunOptions) -> Result<RunOutcome> {
    info!(
        input = %options.input_dir.display(),
        run_date = %options.run_date,
        "Starting access review"
    );

    let loader = SnapshotLoader::new(config.ingestion.clone())
        .context("Invalid ingestion configuration")?;
    let input_dir = options.input_dir.clone();
    let snapshot = tokio::task::spawn_blocking(move || loader.load_dir(&input_dir))
        .await
        .context("Extract loading task failed")?
        .with_context(|| {
            format!(
                "Failed to load extracts from {}",
                options.input_dir.display()
            )
        })?;

    let inspector = Inspector::new(config.inspection.clone());
    let report = inspector
        .run(Arc::new(snapshot), options.run_date)
        .await
        .context("Inspection aborted")?;

    for failure in report.failed_sections() {
        error!(section = %failure.section, reason = %failure.reason, "Report section failed");
    }

    let writer =
        ReportWriter::new(config.report.clone()).context("Invalid report configuration")?;
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.report.output_dir.clone());
    let written = writer
        .write_to(&report, &output_dir)
        .with_context(|| format!("Failed to write report to {}", output_dir.display()))?;

    info!(
        findings = report.finding_count(),
        complete = report.is_complete(),
        "Access review finished"
    );

    Ok(RunOutcome { report, written })
}

/// Prints the outcome of a run to stdout.
pub fn print_outcome(outcome: &RunOutcome, options: &RunOptions, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(outcome, options))?);
        return Ok(());
    }

    let report = &outcome.report;

    println!("{}", "Access Review".bold());
    println!("─────────────");
    println!("  {} {}", "Run date:".cyan(), report.run_date);
    println!("  {} {}", "Input:".cyan(), options.input_dir.display());
    println!();
    print!("{}", ConsoleSummary::new(report));

    println!();
    println!(
        "Report written to {} ({} files)",
        outcome.written.dir.display().to_string().cyan(),
        outcome.written.files.len()
    );

    if !report.is_complete() {
        println!();
        println!(
            "{}",
            format!(
                "Report is partial: {} section(s) failed.",
                report.failed_sections().len()
            )
            .yellow()
            .bold()
        );
    }

    Ok(())
}

fn outcome_json(outcome: &RunOutcome, options: &RunOptions) -> Value {
    let report = &outcome.report;
    let snapshot = &report.snapshot;

    let records: Map<String, Value> = SystemName::ALL
        .iter()
        .filter(|s| !s.is_it_system() || snapshot.is_loaded(**s))
        .map(|s| (s.to_string(), json!(snapshot.record_count(*s))))
        .collect();

    let sections: Map<String, Value> = report
        .sections
        .iter()
        .map(|(rule, section)| {
            let value = match section {
                Ok(outcome) => json!({
                    "checked": outcome.checked,
                    "findings": outcome.findings.len(),
                }),
                Err(failure) => json!({ "error": failure.reason }),
            };
            (rule.to_string(), value)
        })
        .collect();

    let findings_by_severity: Map<String, Value> = ConsoleSummary::new(report)
        .severity_counts()
        .into_iter()
        .map(|(severity, n)| (severity.to_string(), json!(n)))
        .collect();

    json!({
        "run_date": report.run_date,
        "input_dir": options.input_dir,
        "complete": report.is_complete(),
        "failed_sections": report.failed_sections(),
        "records": records,
        "record_issues": snapshot.issues().len(),
        "sections": sections,
        "findings_by_severity": findings_by_severity,
        "output_dir": outcome.written.dir,
        "files": outcome.written.files,
    })
}
