//! The normalized record set for one review run.

use crate::error::ModelError;
use crate::identity::IdentityKey;
use crate::records::{HrRecord, ItAccount};
use crate::system::SystemName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A value that could not be normalized during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIssue {
    /// System whose extract contained the value.
    pub system: SystemName,
    /// Line number in the extract; the header is line 1.
    pub row: usize,
    /// Identity key of the row, when it could be read.
    pub identity_key: Option<IdentityKey>,
    /// Normalized field name (e.g. `join_date`).
    pub field: String,
    /// Raw value as found in the extract.
    pub raw_value: String,
    /// Why the value was rejected.
    pub reason: String,
}

/// HR records and IT accounts loaded for one run.
///
/// A snapshot only knows about the systems that were actually loaded; an
/// unloaded system has no accounts and [`Snapshot::is_loaded`] returns false,
/// which is different from a loaded system with an empty extract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    hr: Vec<HrRecord>,
    accounts: BTreeMap<SystemName, Vec<ItAccount>>,
    loaded: BTreeSet<SystemName>,
    issues: Vec<RecordIssue>,
}

impl Snapshot {
    /// Creates an empty snapshot with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the HR extract and marks the HR source as loaded.
    pub fn set_hr_records(&mut self, records: Vec<HrRecord>) {
        self.hr = records;
        self.loaded.insert(SystemName::HrSource);
    }

    /// Stores the accounts of one IT system and marks it as loaded.
    pub fn set_accounts(
        &mut self,
        system: SystemName,
        accounts: Vec<ItAccount>,
    ) -> Result<(), ModelError> {
        if !system.is_it_system() {
            return Err(ModelError::SystemMismatch {
                expected: "an IT system".to_string(),
                actual: system.to_string(),
            });
        }
        if let Some(stray) = accounts.iter().find(|a| a.system != system) {
            return Err(ModelError::SystemMismatch {
                expected: system.to_string(),
                actual: stray.system.to_string(),
            });
        }
        self.accounts.insert(system, accounts);
        self.loaded.insert(system);
        Ok(())
    }

    /// Records an ingestion issue.
    pub fn push_issue(&mut self, issue: RecordIssue) {
        self.issues.push(issue);
    }

    /// Returns the HR records.
    pub fn hr_records(&self) -> &[HrRecord] {
        &self.hr
    }

    /// Returns the accounts of a system (empty when not loaded).
    pub fn accounts(&self, system: SystemName) -> &[ItAccount] {
        self.accounts.get(&system).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over every IT account, grouped by system in a fixed order.
    pub fn all_accounts(&self) -> impl Iterator<Item = &ItAccount> {
        self.accounts.values().flatten()
    }

    /// Returns true if the system's extract was loaded.
    pub fn is_loaded(&self, system: SystemName) -> bool {
        self.loaded.contains(&system)
    }

    /// Loaded IT systems in a fixed order.
    pub fn loaded_it_systems(&self) -> Vec<SystemName> {
        self.loaded
            .iter()
            .copied()
            .filter(SystemName::is_it_system)
            .collect()
    }

    /// Ingestion issues recorded while loading.
    pub fn issues(&self) -> &[RecordIssue] {
        &self.issues
    }

    /// Number of records held for a system.
    pub fn record_count(&self, system: SystemName) -> usize {
        match system {
            SystemName::HrSource => self.hr.len(),
            other => self.accounts(other).len(),
        }
    }

    /// Identity keys present in the HR extract.
    pub fn hr_identities(&self) -> HashSet<&IdentityKey> {
        self.hr.iter().map(|r| &r.identity_key).collect()
    }

    /// Groups a system's accounts by identity key.
    pub fn accounts_by_identity(&self, system: SystemName) -> HashMap<&IdentityKey, Vec<&ItAccount>> {
        let mut index: HashMap<&IdentityKey, Vec<&ItAccount>> = HashMap::new();
        for account in self.accounts(system) {
            index.entry(&account.identity_key).or_default().push(account);
        }
        index
    }

    /// Returns true if the key appears in any loaded extract.
    pub fn contains_identity(&self, key: &IdentityKey) -> bool {
        self.hr.iter().any(|r| &r.identity_key == key)
            || self.all_accounts().any(|a| &a.identity_key == key)
    }
}
