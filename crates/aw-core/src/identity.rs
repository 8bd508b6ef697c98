//! Identity keys used to join HR records with IT accounts.
//!
//! An [`IdentityKey`] is the normalized form of the address a person or
//! service account is known by (the official e-mail address in practice).
//! Keys are trimmed and lower-cased on construction so that joins across
//! extracts are case-insensitive.

use crate::error::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Local parts shaped like `firstname.lastname`.
static HUMAN_LOCAL_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+\.[a-z]+$").expect("static pattern"));

/// A normalized identity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Normalizes and validates a raw key.
    ///
    /// Surrounding whitespace is removed and the key is lower-cased. Empty keys
    /// and keys containing inner whitespace are rejected.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ModelError::EmptyIdentityKey);
        }
        if key.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidIdentityKey(key.to_string()));
        }
        Ok(Self(key.to_lowercase()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before `@`, or the whole key when there is none.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    /// Returns the domain after `@`, if present.
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, domain)| domain)
    }

    /// Returns true when the key looks like a person's address
    /// (`firstname.lastname@domain`).
    pub fn is_human_format(&self) -> bool {
        self.domain().is_some() && HUMAN_LOCAL_PART.is_match(self.local_part())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdentityKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IdentityKey> for String {
    fn from(key: IdentityKey) -> Self {
        key.0
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let key = IdentityKey::parse("  Jane.Doe@Example.COM ").unwrap();
        assert_eq!(key.as_str(), "jane.doe@example.com");
        assert_eq!(key.local_part(), "jane.doe");
        assert_eq!(key.domain(), Some("example.com"));
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(IdentityKey::parse("   "), Err(ModelError::EmptyIdentityKey));
        assert!(matches!(
            IdentityKey::parse("jane doe@example.com"),
            Err(ModelError::InvalidIdentityKey(_))
        ));
    }

    #[test]
    fn test_human_format() {
        assert!(IdentityKey::parse("jane.doe@example.com")
            .unwrap()
            .is_human_format());
        assert!(!IdentityKey::parse("svc-backup@example.com")
            .unwrap()
            .is_human_format());
        assert!(!IdentityKey::parse("jane.m.doe@example.com")
            .unwrap()
            .is_human_format());
        assert!(!IdentityKey::parse("jane.doe").unwrap().is_human_format());
    }

    #[test]
    fn test_serde_validates() {
        let key: IdentityKey = serde_json::from_str("\"A@B.com\"").unwrap();
        assert_eq!(key.as_str(), "a@b.com");
        assert!(serde_json::from_str::<IdentityKey>("\"\"").is_err());
    }
}
