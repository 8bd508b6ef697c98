//! Summary rows derived from records and findings.

use crate::finding::RuleName;
use crate::system::SystemName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a summary row describes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "scope", rename_all = "snake_case")]
pub enum SummaryCategory {
    /// Whole HR population.
    Hr,
    /// One employee type within HR.
    EmployeeType(String),
    /// One IT system.
    ItSystem(SystemName),
    /// One compliance rule.
    Compliance(RuleName),
}

impl fmt::Display for SummaryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryCategory::Hr => write!(f, "hr"),
            SummaryCategory::EmployeeType(kind) => write!(f, "hr/{}", kind),
            SummaryCategory::ItSystem(system) => write!(f, "it/{}", system),
            SummaryCategory::Compliance(rule) => write!(f, "compliance/{}", rule),
        }
    }
}

/// Value of a summary metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SummaryValue {
    /// A count.
    Count(u64),
    /// A percentage in `0.0..=100.0`.
    Percent(f64),
    /// Not computable (e.g. a rate over zero records).
    NotApplicable,
    /// Free text, used to annotate failed sections.
    Text(String),
}

impl SummaryValue {
    /// Returns the count, if this is one.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            SummaryValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Count(n) => write!(f, "{}", n),
            SummaryValue::Percent(p) => write!(f, "{:.1}%", p),
            SummaryValue::NotApplicable => write!(f, "N/A"),
            SummaryValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One aggregated metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// What the metric is about.
    #[serde(flatten)]
    pub category: SummaryCategory,
    /// Metric name, e.g. `active_accounts`.
    pub metric: String,
    /// Metric value.
    pub value: SummaryValue,
}

impl SummaryRow {
    /// Creates a count row.
    pub fn count(category: SummaryCategory, metric: impl Into<String>, value: usize) -> Self {
        Self {
            category,
            metric: metric.into(),
            value: SummaryValue::Count(value as u64),
        }
    }

    /// Creates a row with an arbitrary value.
    pub fn new(category: SummaryCategory, metric: impl Into<String>, value: SummaryValue) -> Self {
        Self {
            category,
            metric: metric.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(SummaryValue::Count(3).to_string(), "3");
        assert_eq!(SummaryValue::Percent(87.456).to_string(), "87.5%");
        assert_eq!(SummaryValue::NotApplicable.to_string(), "N/A");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(
            SummaryCategory::ItSystem(SystemName::ChatPlatform).to_string(),
            "it/chat_platform"
        );
        assert_eq!(
            SummaryCategory::Compliance(RuleName::Idle).to_string(),
            "compliance/idle"
        );
    }
}
