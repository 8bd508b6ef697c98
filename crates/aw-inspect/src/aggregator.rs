//! Folds rule outcomes and raw record counts into summary tables.
//!
//! Every count is keyed through a `BTreeMap`, so the tables depend only on
//! the contents of the snapshot and the sections, never on record order.

use crate::config::InspectionConfig;
use crate::engine::SectionResult;
use aw_core::{
    Finding, FindingDetail, IdentityKey, RuleName, Severity, Snapshot, SummaryCategory,
    SummaryRow, SummaryValue, SystemName,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const UNSPECIFIED_TYPE: &str = "Unspecified";

/// The three summary tables of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTables {
    /// HR population.
    pub hr: Vec<SummaryRow>,
    /// Per IT system.
    pub it: Vec<SummaryRow>,
    /// Per rule.
    pub compliance: Vec<SummaryRow>,
}

impl SummaryTables {
    /// All rows, HR first.
    pub fn rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.hr.iter().chain(&self.it).chain(&self.compliance)
    }

    /// Looks up one metric.
    pub fn get(&self, category: &SummaryCategory, metric: &str) -> Option<&SummaryValue> {
        self.rows()
            .find(|row| &row.category == category && row.metric == metric)
            .map(|row| &row.value)
    }

    /// Looks up a count metric.
    pub fn count(&self, category: &SummaryCategory, metric: &str) -> Option<u64> {
        self.get(category, metric).and_then(SummaryValue::as_count)
    }
}

/// Builds [`SummaryTables`] for one run.
pub struct Aggregator<'a> {
    snapshot: &'a Snapshot,
    run_date: NaiveDate,
    config: &'a InspectionConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(snapshot: &'a Snapshot, run_date: NaiveDate, config: &'a InspectionConfig) -> Self {
        Self {
            snapshot,
            run_date,
            config,
        }
    }

    /// Builds all three tables.
    pub fn summarize(&self, sections: &BTreeMap<RuleName, SectionResult>) -> SummaryTables {
        SummaryTables {
            hr: self.hr_summary(),
            it: self.it_summary(),
            compliance: self.compliance_summary(sections),
        }
    }

    fn hr_summary(&self) -> Vec<SummaryRow> {
        let records = self.snapshot.hr_records();
        let fy_start = self.config.financial_year_start(self.run_date);
        let is_new_joiner = |date: Option<NaiveDate>| {
            date.map_or(false, |d| d >= fy_start && d <= self.run_date)
        };

        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<&str, TypeCounts> = BTreeMap::new();
        for record in records {
            *by_status.entry(record.employment_status.to_string()).or_default() += 1;

            let kind = record
                .employee_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(UNSPECIFIED_TYPE);
            let counts = by_type.entry(kind).or_default();
            if is_new_joiner(record.join_date) {
                counts.new_joiners += 1;
            }
            if record.employment_status.is_terminated() {
                counts.terminated += 1;
            } else {
                counts.active += 1;
            }
        }

        let mut rows = vec![
            SummaryRow::count(SummaryCategory::Hr, "total_employees", records.len()),
            SummaryRow::count(
                SummaryCategory::Hr,
                "new_joiners",
                records.iter().filter(|r| is_new_joiner(r.join_date)).count(),
            ),
        ];
        rows.extend(by_status.into_iter().map(|(status, n)| {
            SummaryRow::count(SummaryCategory::Hr, format!("status_{}", status), n)
        }));
        rows.push(SummaryRow::count(
            SummaryCategory::Hr,
            "record_issues",
            self.issue_count(SystemName::HrSource),
        ));

        for (kind, counts) in by_type {
            let category = SummaryCategory::EmployeeType(kind.to_string());
            rows.push(SummaryRow::count(category.clone(), "new_joiners", counts.new_joiners));
            rows.push(SummaryRow::count(category.clone(), "active", counts.active));
            rows.push(SummaryRow::count(category, "terminated", counts.terminated));
        }
        rows
    }

    fn it_summary(&self) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for system in self.snapshot.loaded_it_systems() {
            let accounts = self.snapshot.accounts(system);
            let active = accounts
                .iter()
                .filter(|a| a.account_status.is_active())
                .count();
            let category = SummaryCategory::ItSystem(system);

            rows.push(SummaryRow::count(category.clone(), "total_accounts", accounts.len()));
            rows.push(SummaryRow::count(category.clone(), "active_accounts", active));
            rows.push(SummaryRow::count(
                category.clone(),
                "inactive_accounts",
                accounts.len() - active,
            ));
            rows.push(SummaryRow::count(
                category.clone(),
                "system_accounts",
                accounts.iter().filter(|a| a.is_system_account).count(),
            ));
            rows.push(SummaryRow::count(
                category,
                "record_issues",
                self.issue_count(system),
            ));
        }
        rows
    }

    fn compliance_summary(&self, sections: &BTreeMap<RuleName, SectionResult>) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for (rule, section) in sections {
            let category = SummaryCategory::Compliance(*rule);
            let outcome = match section {
                Ok(outcome) => outcome,
                Err(failure) => {
                    rows.push(SummaryRow::new(
                        category,
                        "section_failed",
                        SummaryValue::Text(failure.reason.clone()),
                    ));
                    continue;
                }
            };

            let findings = &outcome.findings;
            let non_compliant = non_compliant_count(*rule, findings);

            rows.push(SummaryRow::count(category.clone(), "checked", outcome.checked));
            rows.push(SummaryRow::count(category.clone(), "findings", findings.len()));
            for severity in Severity::ALL {
                rows.push(SummaryRow::count(
                    category.clone(),
                    format!("severity_{}", severity),
                    findings.iter().filter(|f| f.severity == severity).count(),
                ));
            }
            rows.push(SummaryRow::count(
                category.clone(),
                "missing_data",
                findings.iter().filter(|f| f.is_data_quality()).count(),
            ));
            rows.push(SummaryRow::count(category.clone(), "non_compliant", non_compliant));
            rows.push(SummaryRow::new(
                category.clone(),
                "compliance_rate",
                compliance_rate(outcome.checked, non_compliant),
            ));

            match rule {
                RuleName::Idle => rows.extend(idle_rows(&category, findings)),
                RuleName::SystemUser => rows.extend(system_user_rows(&category, findings)),
                _ => {}
            }
        }
        rows
    }

    fn issue_count(&self, system: SystemName) -> usize {
        self.snapshot
            .issues()
            .iter()
            .filter(|i| i.system == system)
            .count()
    }
}

#[derive(Default)]
struct TypeCounts {
    new_joiners: usize,
    active: usize,
    terminated: usize,
}

/// Joiner and leaver count people; idle and system-user count accounts, the
/// same unit their `checked` counts. Both emit at most one finding per account.
fn non_compliant_count(rule: RuleName, findings: &[Finding]) -> usize {
    let compliance = findings.iter().filter(|f| !f.is_data_quality());
    match rule {
        RuleName::Idle | RuleName::SystemUser => compliance.count(),
        _ => compliance
            .map(|f| &f.identity_key)
            .collect::<BTreeSet<&IdentityKey>>()
            .len(),
    }
}

fn compliance_rate(checked: usize, non_compliant: usize) -> SummaryValue {
    if checked == 0 {
        return SummaryValue::NotApplicable;
    }
    let compliant = checked.saturating_sub(non_compliant);
    SummaryValue::Percent(compliant as f64 * 100.0 / checked as f64)
}

fn idle_rows(category: &SummaryCategory, findings: &[Finding]) -> Vec<SummaryRow> {
    let mut by_bucket = BTreeMap::new();
    let mut by_system: BTreeMap<SystemName, usize> = BTreeMap::new();
    let mut never_active = 0;

    for finding in findings {
        match &finding.detail {
            FindingDetail::Idle { bucket, .. } => *by_bucket.entry(*bucket).or_insert(0) += 1,
            FindingDetail::NeverActive { .. } => never_active += 1,
            _ => continue,
        }
        *by_system.entry(finding.system).or_default() += 1;
    }

    let mut rows: Vec<SummaryRow> = aw_core::IdleBucket::ALL
        .iter()
        .map(|bucket| {
            SummaryRow::count(
                category.clone(),
                format!("bucket_{}", bucket),
                by_bucket.get(bucket).copied().unwrap_or(0),
            )
        })
        .collect();
    rows.push(SummaryRow::count(category.clone(), "never_active", never_active));
    rows.extend(by_system.into_iter().map(|(system, n)| {
        SummaryRow::count(category.clone(), format!("idle_{}", system), n)
    }));
    rows
}

fn system_user_rows(category: &SummaryCategory, findings: &[Finding]) -> Vec<SummaryRow> {
    let mut human = 0;
    let mut service = 0;
    let mut by_system: BTreeMap<SystemName, usize> = BTreeMap::new();

    for finding in findings {
        if let FindingDetail::UntrackedAccount { human_format, .. } = &finding.detail {
            if *human_format {
                human += 1;
            } else {
                service += 1;
            }
            *by_system.entry(finding.system).or_default() += 1;
        }
    }

    let mut rows = vec![
        SummaryRow::count(category.clone(), "human_format", human),
        SummaryRow::count(category.clone(), "system_format", service),
    ];
    rows.extend(by_system.into_iter().map(|(system, n)| {
        SummaryRow::count(category.clone(), format!("untracked_{}", system), n)
    }));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleFailure;
    use crate::rules::test_support::{account, date, days_before, key};
    use crate::rules::{EvaluationContext, IdleRule, Rule, RuleOutcome, SystemUserRule};
    use aw_core::{EmploymentStatus, HrRecord};

    fn run_date() -> NaiveDate {
        date(2024, 6, 1)
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.set_hr_records(vec![
            HrRecord::new(key("a.one@example.com"), EmploymentStatus::Active)
                .with_join_date(date(2024, 5, 1))
                .with_employee_type("Full Time"),
            HrRecord::new(key("b.two@example.com"), EmploymentStatus::Active)
                .with_join_date(date(2023, 1, 1))
                .with_employee_type("Intern"),
            HrRecord::new(key("c.three@example.com"), EmploymentStatus::Terminated)
                .with_employee_type("Full Time"),
        ]);
        snapshot
            .set_accounts(
                SystemName::ChatPlatform,
                vec![
                    account("a.one@example.com", SystemName::ChatPlatform)
                        .with_last_login(days_before(run_date(), 2)),
                    account("b.two@example.com", SystemName::ChatPlatform)
                        .with_last_login(days_before(run_date(), 50)),
                    account("slackbot", SystemName::ChatPlatform).as_system_account(),
                ],
            )
            .unwrap();
        snapshot
    }

    fn sections(snapshot: &Snapshot) -> BTreeMap<RuleName, SectionResult> {
        let config = InspectionConfig::default();
        let ctx = EvaluationContext::new(snapshot, run_date(), &config);
        let mut sections = BTreeMap::new();
        for rule in [&IdleRule as &dyn Rule, &SystemUserRule] {
            sections.insert(rule.name(), Ok(rule.evaluate(&ctx).unwrap()));
        }
        sections
    }

    #[test]
    fn test_hr_summary() {
        let snapshot = snapshot();
        let config = InspectionConfig::default();
        let tables = Aggregator::new(&snapshot, run_date(), &config).summarize(&BTreeMap::new());

        assert_eq!(tables.count(&SummaryCategory::Hr, "total_employees"), Some(3));
        assert_eq!(tables.count(&SummaryCategory::Hr, "new_joiners"), Some(1));
        assert_eq!(tables.count(&SummaryCategory::Hr, "status_active"), Some(2));
        assert_eq!(tables.count(&SummaryCategory::Hr, "status_terminated"), Some(1));

        let full_time = SummaryCategory::EmployeeType("Full Time".to_string());
        assert_eq!(tables.count(&full_time, "new_joiners"), Some(1));
        assert_eq!(tables.count(&full_time, "active"), Some(1));
        assert_eq!(tables.count(&full_time, "terminated"), Some(1));
    }

    #[test]
    fn test_it_summary() {
        let snapshot = snapshot();
        let config = InspectionConfig::default();
        let tables = Aggregator::new(&snapshot, run_date(), &config).summarize(&BTreeMap::new());

        let chat = SummaryCategory::ItSystem(SystemName::ChatPlatform);
        assert_eq!(tables.count(&chat, "total_accounts"), Some(3));
        assert_eq!(tables.count(&chat, "active_accounts"), Some(3));
        assert_eq!(tables.count(&chat, "system_accounts"), Some(1));
        assert!(tables
            .get(&SummaryCategory::ItSystem(SystemName::IdentityProvider), "total_accounts")
            .is_none());
    }

    #[test]
    fn test_compliance_summary() {
        let snapshot = snapshot();
        let config = InspectionConfig::default();
        let tables =
            Aggregator::new(&snapshot, run_date(), &config).summarize(&sections(&snapshot));

        let idle = SummaryCategory::Compliance(RuleName::Idle);
        assert_eq!(tables.count(&idle, "checked"), Some(3));
        assert_eq!(tables.count(&idle, "bucket_45"), Some(1));
        assert_eq!(tables.count(&idle, "never_active"), Some(1));
        assert_eq!(tables.count(&idle, "non_compliant"), Some(2));
        assert_eq!(tables.count(&idle, "idle_chat_platform"), Some(2));

        let system_user = SummaryCategory::Compliance(RuleName::SystemUser);
        assert_eq!(tables.count(&system_user, "system_format"), Some(1));
        assert_eq!(tables.count(&system_user, "human_format"), Some(0));
        match tables.get(&system_user, "compliance_rate") {
            Some(SummaryValue::Percent(p)) => assert!((p - 66.666).abs() < 0.01),
            other => panic!("unexpected rate {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_idle_accounts_counted_per_account() {
        let mut snapshot = Snapshot::new();
        snapshot.set_hr_records(vec![HrRecord::new(
            key("a.one@example.com"),
            EmploymentStatus::Active,
        )]);
        snapshot
            .set_accounts(
                SystemName::ChatPlatform,
                vec![
                    account("a.one@example.com", SystemName::ChatPlatform)
                        .with_last_login(days_before(run_date(), 60)),
                    account("a.one@example.com", SystemName::ChatPlatform)
                        .with_last_login(days_before(run_date(), 130)),
                ],
            )
            .unwrap();

        let config = InspectionConfig::default();
        let tables =
            Aggregator::new(&snapshot, run_date(), &config).summarize(&sections(&snapshot));

        let idle = SummaryCategory::Compliance(RuleName::Idle);
        assert_eq!(tables.count(&idle, "checked"), Some(2));
        assert_eq!(tables.count(&idle, "non_compliant"), Some(2));
        assert_eq!(
            tables.get(&idle, "compliance_rate"),
            Some(&SummaryValue::Percent(0.0))
        );
    }

    #[test]
    fn test_rate_not_applicable_when_nothing_checked() {
        assert_eq!(compliance_rate(0, 0), SummaryValue::NotApplicable);
        assert_eq!(compliance_rate(4, 1), SummaryValue::Percent(75.0));
    }

    #[test]
    fn test_failed_section_is_annotated() {
        let snapshot = snapshot();
        let config = InspectionConfig::default();
        let mut sections = BTreeMap::new();
        sections.insert(
            RuleName::Leaver,
            Err(RuleFailure {
                section: "leaver".to_string(),
                reason: "panicked".to_string(),
            }),
        );
        sections.insert(RuleName::Joiner, Ok(RuleOutcome::new(RuleName::Joiner)));

        let tables = Aggregator::new(&snapshot, run_date(), &config).summarize(&sections);
        let leaver = SummaryCategory::Compliance(RuleName::Leaver);
        assert_eq!(
            tables.get(&leaver, "section_failed"),
            Some(&SummaryValue::Text("panicked".to_string()))
        );
        assert!(tables.get(&leaver, "checked").is_none());
        assert_eq!(
            tables.get(&SummaryCategory::Compliance(RuleName::Joiner), "compliance_rate"),
            Some(&SummaryValue::NotApplicable)
        );
    }
}
