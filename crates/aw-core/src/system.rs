//! The fixed set of source systems an access review covers.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source system whose extract feeds the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemName {
    /// HR system of record (employees, joining and exit dates).
    HrSource,
    /// Identity provider / SSO directory.
    IdentityProvider,
    /// Chat platform workspace.
    ChatPlatform,
    /// Productivity suite (mail, documents).
    ProductivitySuite,
}

impl SystemName {
    /// All systems, HR first.
    pub const ALL: [SystemName; 4] = [
        SystemName::HrSource,
        SystemName::IdentityProvider,
        SystemName::ChatPlatform,
        SystemName::ProductivitySuite,
    ];

    /// The IT systems whose accounts are reviewed.
    pub const IT_SYSTEMS: [SystemName; 3] = [
        SystemName::IdentityProvider,
        SystemName::ChatPlatform,
        SystemName::ProductivitySuite,
    ];

    /// Returns the snake_case identifier used in config and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemName::HrSource => "hr_source",
            SystemName::IdentityProvider => "identity_provider",
            SystemName::ChatPlatform => "chat_platform",
            SystemName::ProductivitySuite => "productivity_suite",
        }
    }

    /// Returns a human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            SystemName::HrSource => "HR Source",
            SystemName::IdentityProvider => "Identity Provider",
            SystemName::ChatPlatform => "Chat Platform",
            SystemName::ProductivitySuite => "Productivity Suite",
        }
    }

    /// Returns true for systems that hold user accounts rather than employees.
    pub fn is_it_system(&self) -> bool {
        !matches!(self, SystemName::HrSource)
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SystemName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "hr_source" | "hr" => Ok(SystemName::HrSource),
            "identity_provider" | "idp" => Ok(SystemName::IdentityProvider),
            "chat_platform" | "chat" => Ok(SystemName::ChatPlatform),
            "productivity_suite" | "productivity" => Ok(SystemName::ProductivitySuite),
            other => Err(ModelError::UnknownSystem(other.to_string())),
        }
    }
}
