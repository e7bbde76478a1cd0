//! Billing row types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Account bucket for rows that carry no account/project value
pub const UNASSIGNED_ACCOUNT: &str = "unassigned";

/// Billing period of a row: a calendar day, a calendar month, or an opaque
/// billing-cycle label such as "2024-Q1" or "cycle-17".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BillingPeriod {
    Date(NaiveDate),
    Month { year: i32, month: u32 },
    Cycle(String),
}

impl BillingPeriod {
    /// Parse a period cell. Blank cells have no period.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self::Date(date));
        }

        if let Some((y, m)) = raw.split_once('-') {
            if y.len() == 4 && (1..=2).contains(&m.len()) {
                if let (Ok(year), Ok(month)) = (y.parse::<i32>(), m.parse::<u32>()) {
                    if (1..=12).contains(&month) {
                        return Some(Self::Month { year, month });
                    }
                }
            }
        }

        Some(Self::Cycle(raw.to_string()))
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Cycle(label) => f.write_str(label),
        }
    }
}

impl Serialize for BillingPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of spend data. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRecord {
    pub service: String,
    pub account_or_project: String,
    pub tags: BTreeMap<String, String>,
    pub amount: Decimal,
    pub period: Option<BillingPeriod>,
}

impl CostRecord {
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Parse a tags cell: `key=value` or `key:value` pairs separated by `;` or `|`.
/// A bare key maps to an empty value.
pub fn parse_tags(raw: &str) -> BTreeMap<String, String> {
    raw.split([';', '|'])
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once(['=', ':']) {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (pair.to_string(), String::new()),
        })
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
