//! Writes report files to disk.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::rows::{AccountRow, FindingRow, HrRow, SummaryCsvRow};
use aw_core::{RecordIssue, RuleName, SystemName};
use aw_inspect::{InspectionReport, RuleFailure, SectionResult, SummaryTables};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Files produced by one [`ReportWriter::write_to`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenReport {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// The JSON form of a report.
#[derive(Serialize)]
struct JsonReport<'a> {
    run_date: NaiveDate,
    complete: bool,
    failed_sections: Vec<&'a RuleFailure>,
    record_counts: BTreeMap<SystemName, usize>,
    record_issues: &'a [RecordIssue],
    sections: &'a BTreeMap<RuleName, SectionResult>,
    summaries: &'a Result<SummaryTables, RuleFailure>,
}

/// Renders inspection reports as CSV sheets plus `report.json`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    /// Creates a writer, validating the date format up front.
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Writes into the configured output directory.
    pub fn write(&self, report: &InspectionReport) -> Result<WrittenReport, ReportError> {
        self.write_to(report, &self.config.output_dir)
    }

    /// Writes every sheet into `dir`, creating it if needed.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn write_to(
        &self,
        report: &InspectionReport,
        dir: &Path,
    ) -> Result<WrittenReport, ReportError> {
        fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = WrittenReport {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        };
        let date_format = self.config.date_format.as_str();

        let path = dir.join("summary.csv");
        write_csv(&path, summary_rows(report))?;
        written.files.push(path);

        for (rule, section) in &report.sections {
            let Ok(outcome) = section else {
                continue;
            };
            let path = dir.join(format!("findings_{}.csv", rule));
            write_csv(
                &path,
                outcome
                    .findings
                    .iter()
                    .map(|f| FindingRow::from_finding(f, date_format)),
            )?;
            written.files.push(path);
        }

        if self.config.write_record_sheets {
            let snapshot = &report.snapshot;
            let path = dir.join(format!("records_{}.csv", SystemName::HrSource));
            write_csv(
                &path,
                snapshot
                    .hr_records()
                    .iter()
                    .map(|r| HrRow::from_record(r, date_format)),
            )?;
            written.files.push(path);

            for system in snapshot.loaded_it_systems() {
                let path = dir.join(format!("records_{}.csv", system));
                write_csv(
                    &path,
                    snapshot
                        .accounts(system)
                        .iter()
                        .map(|a| AccountRow::from_account(a, date_format)),
                )?;
                written.files.push(path);
            }
        }

        let path = dir.join("report.json");
        write_json(&path, &json_report(report))?;
        written.files.push(path);

        info!(files = written.files.len(), "Report written");
        Ok(written)
    }
}

fn summary_rows(report: &InspectionReport) -> Vec<SummaryCsvRow> {
    match &report.summaries {
        Ok(tables) => tables
            .hr
            .iter()
            .map(|row| SummaryCsvRow::from_row("hr", row))
            .chain(tables.it.iter().map(|row| SummaryCsvRow::from_row("it", row)))
            .chain(
                tables
                    .compliance
                    .iter()
                    .map(|row| SummaryCsvRow::from_row("compliance", row)),
            )
            .collect(),
        // Without tables, at least say what failed.
        Err(_) => report
            .failed_sections()
            .into_iter()
            .map(|failure| SummaryCsvRow {
                table: "failures".to_string(),
                category: failure.section.clone(),
                metric: "section_failed".to_string(),
                value: failure.reason.clone(),
            })
            .collect(),
    }
}

fn json_report(report: &InspectionReport) -> JsonReport<'_> {
    let snapshot = &report.snapshot;
    let record_counts = SystemName::ALL
        .into_iter()
        .filter(|s| snapshot.is_loaded(*s))
        .map(|s| (s, snapshot.record_count(s)))
        .collect();

    JsonReport {
        run_date: report.run_date,
        complete: report.is_complete(),
        failed_sections: report.failed_sections(),
        record_counts,
        record_issues: snapshot.issues(),
        sections: &report.sections,
        summaries: &report.summaries,
    }
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<(), ReportError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    let mut count = 0usize;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
        count += 1;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = count, "Sheet written");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
