//! Aggregated cost profile types

use super::{OptiscaleError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// Spend grouped under one service, account or period
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CostBucket {
    pub name: String,
    pub total: Decimal,
    /// Share of the profile total, in percent (2dp)
    pub share_percent: Decimal,
    pub row_count: u64,
}

impl CostBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add one row's amount; fails if the bucket total overflows
    pub fn add(&mut self, amount: Decimal) -> Result<()> {
        self.total = self.total.checked_add(amount).ok_or_else(|| {
            OptiscaleError::malformed(format!("total for '{}' is out of range", self.name))
        })?;
        self.row_count = self.row_count.saturating_add(1);
        Ok(())
    }
}

/// Result of profiling a set of cost records. Derived on every request.
///
/// `by_service` and `by_account` are sorted by total descending (ties by name),
/// so the first entries are the top spend drivers. Both sum to `total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostProfile {
    pub currency: String,
    pub cloud_provider: String,
    pub row_count: u64,
    pub total: Decimal,
    pub by_service: Vec<CostBucket>,
    pub by_account: Vec<CostBucket>,
    /// Only rows that carry a period; sorted by period label ascending
    pub by_period: Vec<CostBucket>,
    /// Spend on rows without any tags
    pub untagged_total: Decimal,
    pub detected_columns: Vec<String>,
    pub amount_column: String,
}

impl CostProfile {
    pub fn top_services(&self, n: usize) -> &[CostBucket] {
        &self.by_service[..n.min(self.by_service.len())]
    }

    pub fn top_accounts(&self, n: usize) -> &[CostBucket] {
        &self.by_account[..n.min(self.by_account.len())]
    }

    /// Exact service lookup (input is trimmed)
    pub fn service(&self, name: &str) -> Option<&CostBucket> {
        let name = name.trim();
        self.by_service.iter().find(|b| b.name == name)
    }

    pub fn service_total(&self, name: &str) -> Option<Decimal> {
        self.service(name).map(|b| b.total)
    }
}
