//! Loads a directory of extracts into a [`Snapshot`].

use crate::adapters::{default_adapters, ExtractAdapter, ExtractRecord};
use crate::config::IngestionConfig;
use crate::dates::DateNormalizer;
use crate::error::IngestError;
use crate::table::{ExtractTable, RowReader};
use aw_core::{IdentityKey, RecordIssue, Snapshot, SystemName};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Reads every system's extract from one input directory.
pub struct SnapshotLoader {
    config: IngestionConfig,
    adapters: Vec<Box<dyn ExtractAdapter>>,
    service_patterns: Vec<Regex>,
    dates: DateNormalizer,
}

impl SnapshotLoader {
    /// Creates a loader with the built-in adapters.
    pub fn new(config: IngestionConfig) -> Result<Self, IngestError> {
        let service_patterns = config.compile_patterns()?;
        let dates = DateNormalizer::new(config.date_order);
        Ok(Self {
            config,
            adapters: default_adapters(),
            service_patterns,
            dates,
        })
    }

    /// Returns the ingestion configuration.
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Where the extract for `system` is expected inside `dir`.
    pub fn extract_path(&self, dir: &Path, system: SystemName) -> PathBuf {
        let stem = self.config.file_stem(system).unwrap_or_else(|| {
            self.adapters
                .iter()
                .find(|a| a.system() == system)
                .map(|a| a.default_stem())
                .unwrap_or_else(|| system.as_str())
        });
        dir.join(format!("{}.csv", stem))
    }

    /// Loads every extract found in `dir`.
    ///
    /// A missing extract is fatal unless its system is listed as optional.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> Result<Snapshot, IngestError> {
        if !dir.is_dir() {
            return Err(IngestError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory not found",
                ),
            });
        }

        let mut snapshot = Snapshot::new();
        for adapter in &self.adapters {
            let system = adapter.system();
            let path = self.extract_path(dir, system);

            if !path.is_file() {
                if self.config.is_optional(system) {
                    warn!(system = %system, path = %path.display(), "Optional extract not found, skipping");
                    continue;
                }
                return Err(IngestError::MissingFile { system, path });
            }

            info!(system = %system, path = %path.display(), "Loading extract");
            let table = ExtractTable::from_path(&path)?;
            let (records, issues) = self.read_table(adapter.as_ref(), &table)?;

            info!(
                system = %system,
                rows = table.len(),
                records = records.len(),
                issues = issues.len(),
                "Extract loaded"
            );
            for issue in &issues {
                warn!(
                    system = %system,
                    row = issue.row,
                    field = %issue.field,
                    value = %issue.raw_value,
                    "{}",
                    issue.reason
                );
            }

            let mut hr = Vec::new();
            let mut accounts = Vec::new();
            for record in records {
                match record {
                    ExtractRecord::Hr(record) => hr.push(record),
                    ExtractRecord::Account(account) => accounts.push(account),
                }
            }
            if system == SystemName::HrSource {
                snapshot.set_hr_records(hr);
            } else {
                snapshot.set_accounts(system, accounts)?;
            }
            for issue in issues {
                snapshot.push_issue(issue);
            }
        }

        Ok(snapshot)
    }

    /// Converts an already-read table with one adapter.
    pub fn read_table(
        &self,
        adapter: &dyn ExtractAdapter,
        table: &ExtractTable,
    ) -> Result<(Vec<ExtractRecord>, Vec<RecordIssue>), IngestError> {
        let system = adapter.system();
        table.require_columns(system, adapter.required_columns())?;

        let mut records = Vec::with_capacity(table.len());
        let mut issues = Vec::new();
        for (line, row) in table.rows() {
            let mut reader = RowReader::new(system, line, table, row, &self.dates);
            match adapter.read_row(&mut reader) {
                Some(ExtractRecord::Account(mut account)) => {
                    if !account.is_system_account && self.is_service_account(&account.identity_key)
                    {
                        debug!(identity = %account.identity_key, "Marked as service account");
                        account.is_system_account = true;
                    }
                    records.push(ExtractRecord::Account(account));
                }
                Some(record) => records.push(record),
                None => debug!(system = %system, line, "Row skipped"),
            }
            issues.extend(reader.into_issues());
        }

        Ok((records, issues))
    }

    fn is_service_account(&self, key: &IdentityKey) -> bool {
        self.service_patterns
            .iter()
            .any(|pattern| pattern.is_match(key.as_str()))
    }
}
