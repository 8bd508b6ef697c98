//! Extract adapters, one per source system.

use crate::table::RowReader;
use aw_core::{HrRecord, ItAccount, SystemName};

pub mod gws;
pub mod hr;
pub mod okta;
pub mod slack;

pub use gws::GwsAdapter;
pub use hr::HrAdapter;
pub use okta::OktaAdapter;
pub use slack::SlackAdapter;

/// A record produced from one extract row.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractRecord {
    Hr(HrRecord),
    Account(ItAccount),
}

/// Maps one system's export format onto the normalized records.
pub trait ExtractAdapter: Send + Sync {
    /// System the extract comes from.
    fn system(&self) -> SystemName;

    /// File name without extension, used when the configuration does not
    /// override it.
    fn default_stem(&self) -> &'static str;

    /// Columns that must be present for the extract to load at all.
    fn required_columns(&self) -> &'static [&'static str];

    /// Converts a row. Returns `None` when the row cannot identify anyone;
    /// the reason is recorded on the reader.
    fn read_row(&self, row: &mut RowReader<'_>) -> Option<ExtractRecord>;
}

/// Adapter for a system.
pub fn adapter_for(system: SystemName) -> Box<dyn ExtractAdapter> {
    match system {
        SystemName::HrSource => Box::new(HrAdapter),
        SystemName::IdentityProvider => Box::new(OktaAdapter),
        SystemName::ChatPlatform => Box::new(SlackAdapter),
        SystemName::ProductivitySuite => Box::new(GwsAdapter),
    }
}

/// Adapters for every system, HR first.
pub fn default_adapters() -> Vec<Box<dyn ExtractAdapter>> {
    SystemName::ALL.into_iter().map(adapter_for).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dates::DateNormalizer;
    use crate::table::ExtractTable;
    use aw_core::RecordIssue;

    /// Runs an adapter over CSV text.
    pub fn read_all(
        adapter: &dyn ExtractAdapter,
        csv: &str,
    ) -> (Vec<ExtractRecord>, Vec<RecordIssue>) {
        let table = ExtractTable::from_reader(csv.as_bytes()).unwrap();
        table
            .require_columns(adapter.system(), adapter.required_columns())
            .unwrap();
        let dates = DateNormalizer::default();

        let mut records = Vec::new();
        let mut issues = Vec::new();
        for (line, record) in table.rows() {
            let mut reader = RowReader::new(adapter.system(), line, &table, record, &dates);
            if let Some(parsed) = adapter.read_row(&mut reader) {
                records.push(parsed);
            }
            issues.extend(reader.into_issues());
        }
        (records, issues)
    }

    pub fn accounts(records: Vec<ExtractRecord>) -> Vec<ItAccount> {
        records
            .into_iter()
            .filter_map(|r| match r {
                ExtractRecord::Account(account) => Some(account),
                ExtractRecord::Hr(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapters_cover_every_system() {
        let adapters = default_adapters();
        let systems: Vec<_> = adapters.iter().map(|a| a.system()).collect();
        assert_eq!(systems, SystemName::ALL.to_vec());

        let stems: Vec<_> = adapters.iter().map(|a| a.default_stem()).collect();
        assert_eq!(stems, vec!["darwinbox", "okta", "slack", "gws"]);
    }
}
