//! Raw CSV extracts and per-row field access.

use crate::dates::DateNormalizer;
use crate::error::IngestError;
use aw_core::{DateField, IdentityKey, ModelError, RecordIssue, SystemName};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

/// Cell values treated as null, compared case-insensitively.
pub const NULL_TOKENS: [&str; 4] = ["", "na", "n/a", "never logged in"];

/// Returns true for values that mean "no value".
pub fn is_null(value: &str) -> bool {
    let value = value.trim();
    NULL_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t))
}

/// An extract as read from disk: headers plus string rows.
#[derive(Debug, Clone)]
pub struct ExtractTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl ExtractTable {
    /// Reads a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads CSV from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            index.entry(header.to_lowercase()).or_insert(i);
        }

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            index,
            rows,
        })
    }

    /// Column headers, trimmed.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a column, matched case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(&name.trim().to_lowercase()).copied()
    }

    /// Fails on the first required column that is absent.
    pub fn require_columns(&self, system: SystemName, names: &[&str]) -> Result<(), IngestError> {
        match names.iter().find(|name| self.column(name).is_none()) {
            Some(missing) => Err(IngestError::MissingColumn {
                system,
                column: (*missing).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows with their line number in the file (the header is line 1).
    pub fn rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.rows.iter().enumerate().map(|(i, row)| (i + 2, row))
    }
}

/// A date cell after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// Column absent or cell null.
    Empty,
    Valid(NaiveDate),
    /// A value was present but did not parse. An issue has been recorded.
    Unreadable,
}

impl DateCell {
    pub fn value(self) -> Option<NaiveDate> {
        match self {
            DateCell::Valid(date) => Some(date),
            DateCell::Empty | DateCell::Unreadable => None,
        }
    }

    pub fn is_unreadable(self) -> bool {
        matches!(self, DateCell::Unreadable)
    }
}

/// Reads typed fields from one row, collecting issues as it goes.
pub struct RowReader<'a> {
    system: SystemName,
    line: usize,
    table: &'a ExtractTable,
    record: &'a StringRecord,
    dates: &'a DateNormalizer,
    identity: Option<IdentityKey>,
    issues: Vec<RecordIssue>,
}

impl<'a> RowReader<'a> {
    pub fn new(
        system: SystemName,
        line: usize,
        table: &'a ExtractTable,
        record: &'a StringRecord,
        dates: &'a DateNormalizer,
    ) -> Self {
        Self {
            system,
            line,
            table,
            record,
            dates,
            identity: None,
            issues: Vec::new(),
        }
    }

    /// Raw cell text, or `None` when the column is absent or the cell is null.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let value = self.table.column(column).and_then(|i| self.record.get(i))?;
        if is_null(value) {
            None
        } else {
            Some(value.trim())
        }
    }

    /// Reads the identity key. A missing or malformed key is recorded as an
    /// issue and the row should be skipped.
    pub fn identity(&mut self, column: &str) -> Option<IdentityKey> {
        let raw = self.text(column).unwrap_or_default();
        match IdentityKey::parse(raw) {
            Ok(key) => {
                self.identity = Some(key.clone());
                Some(key)
            }
            Err(err) => {
                let reason = match err {
                    ModelError::EmptyIdentityKey => "empty identity key".to_string(),
                    other => other.to_string(),
                };
                self.issue(column, raw, reason);
                None
            }
        }
    }

    /// Reads a date cell. Unparseable values are recorded as issues.
    pub fn read_date(&mut self, column: &str) -> DateCell {
        let Some(raw) = self.text(column) else {
            return DateCell::Empty;
        };
        match self.dates.parse(raw) {
            Ok(date) => DateCell::Valid(date),
            Err(err) => {
                self.issue(column, raw, err.to_string());
                DateCell::Unreadable
            }
        }
    }

    /// Reads a date, reading unparseable values as null.
    pub fn date(&mut self, column: &str) -> Option<NaiveDate> {
        self.read_date(column).value()
    }

    /// Reads a date into a record field, adding `field` to `unreadable` when
    /// the value does not parse.
    pub fn date_into(
        &mut self,
        column: &str,
        field: DateField,
        unreadable: &mut BTreeSet<DateField>,
    ) -> Option<NaiveDate> {
        let cell = self.read_date(column);
        if cell.is_unreadable() {
            unreadable.insert(field);
        }
        cell.value()
    }

    /// Records an issue against this row.
    pub fn issue(&mut self, field: &str, raw_value: &str, reason: impl Into<String>) {
        self.issues.push(RecordIssue {
            system: self.system,
            row: self.line,
            identity_key: self.identity.clone(),
            field: field.to_string(),
            raw_value: raw_value.to_string(),
            reason: reason.into(),
        });
    }

    /// Line number of the row in its file.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Issues recorded while reading the row.
    pub fn into_issues(self) -> Vec<RecordIssue> {
        self.issues
    }
}
