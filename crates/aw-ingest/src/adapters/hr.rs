//! HR extract (Darwinbox employee export).

use super::{ExtractAdapter, ExtractRecord};
use crate::table::RowReader;
use aw_core::{DateField, EmploymentStatus, HrRecord, SystemName};

const EMAIL: &str = "Official Email ID";
const JOINED: &str = "Date Of Joining";
const EXITED: &str = "Date Of Exit";
const STATUS: &str = "Employment Status";
const EMPLOYEE_TYPE: &str = "Employee Type";

#[derive(Debug, Clone, Copy, Default)]
pub struct HrAdapter;

impl ExtractAdapter for HrAdapter {
    fn system(&self) -> SystemName {
        SystemName::HrSource
    }

    fn default_stem(&self) -> &'static str {
        "darwinbox"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[EMAIL, JOINED, EXITED, STATUS]
    }

    fn read_row(&self, row: &mut RowReader<'_>) -> Option<ExtractRecord> {
        let key = row.identity(EMAIL)?;
        let status = EmploymentStatus::parse(row.text(STATUS).unwrap_or_default());

        let mut record = HrRecord::new(key, status);
        record.join_date =
            row.date_into(JOINED, DateField::JoinDate, &mut record.unreadable_dates);
        record.exit_date =
            row.date_into(EXITED, DateField::ExitDate, &mut record.unreadable_dates);
        record.employee_type = row.text(EMPLOYEE_TYPE).map(str::to_string);

        Some(ExtractRecord::Hr(record))
    }
}
