//! Writing a full report into a temporary directory.

use aw_core::{
    AccountStatus, EmploymentStatus, HrRecord, IdentityKey, ItAccount, Snapshot, SystemName,
};
use aw_inspect::{InspectionConfig, InspectionReport, Inspector};
use aw_report::{ReportConfig, ReportWriter};
use chrono::{Duration, NaiveDate};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn key(raw: &str) -> IdentityKey {
    IdentityKey::parse(raw).unwrap()
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn report() -> InspectionReport {
    let mut snapshot = Snapshot::new();
    snapshot.set_hr_records(vec![
        HrRecord::new(key("u1@example.com"), EmploymentStatus::Active)
            .with_join_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
        HrRecord::new(key("u3@example.com"), EmploymentStatus::Terminated)
            .with_exit_date(run_date() - Duration::days(30)),
    ]);
    snapshot
        .set_accounts(
            SystemName::IdentityProvider,
            vec![
                ItAccount::new(key("u1@example.com"), SystemName::IdentityProvider, AccountStatus::Active)
                    .with_created_date(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap())
                    .with_last_login(run_date() - Duration::days(95)),
                ItAccount::new(key("u3@example.com"), SystemName::IdentityProvider, AccountStatus::Active),
            ],
        )
        .unwrap();

    Inspector::new(InspectionConfig::default())
        .inspect(Arc::new(snapshot), run_date())
        .unwrap()
}

#[test]
fn test_writes_all_sheets() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let writer = ReportWriter::new(ReportConfig::default()).unwrap();

    let written = writer.write_to(&report(), &out).unwrap();

    for name in [
        "summary.csv",
        "findings_joiner.csv",
        "findings_leaver.csv",
        "findings_idle.csv",
        "findings_system_user.csv",
        "findings_data_quality.csv",
        "records_hr_source.csv",
        "records_identity_provider.csv",
        "report.json",
    ] {
        assert!(out.join(name).is_file(), "{} missing", name);
    }
    assert_eq!(written.files.len(), 9);

    let joiners = fs::read_to_string(out.join("findings_joiner.csv")).unwrap();
    assert!(joiners.starts_with("identity_key,system,severity,finding"));
    assert!(joiners.contains("u1@example.com,Identity Provider,medium,late provisioning,10-01-2024,20-01-2024,10"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("hr,hr,total_employees,2"));
    assert!(summary.contains("compliance,compliance/leaver,non_compliant,1"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(ReportConfig::default()).unwrap();
    writer.write_to(&report(), dir.path()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["run_date"], "2024-06-01");
    assert_eq!(json["complete"], true);
    assert_eq!(json["record_counts"]["hr_source"], 2);
    assert!(json["sections"]["idle"]["Ok"]["findings"].is_array());
}

#[test]
fn test_record_sheets_optional() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(ReportConfig {
        write_record_sheets: false,
        ..Default::default()
    })
    .unwrap();

    writer.write_to(&report(), dir.path()).unwrap();
    assert!(!dir.path().join("records_hr_source.csv").exists());
    assert!(dir.path().join("summary.csv").exists());
}
