//! Profiler service for grouping spend into a cost profile

use crate::config::Settings;
use crate::parsers::{BillingParser, DelimitedParser, ParsedBilling};
use crate::services::money::{checked_sum, percent_of};
use crate::types::{CostBucket, CostProfile, CostRecord, OptiscaleError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Groups cost records by service, account and period
#[derive(Debug, Clone)]
pub struct CostProfiler {
    currency: String,
    cloud_provider: String,
}

impl CostProfiler {
    pub fn new(currency: impl Into<String>, cloud_provider: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            cloud_provider: cloud_provider.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.currency, &settings.cloud_provider)
    }

    /// Parse CSV text and profile it in one step
    pub fn load_and_profile(&self, csv_text: &str) -> Result<CostProfile> {
        let parsed = DelimitedParser::csv().parse_str(csv_text)?;
        self.profile(&parsed)
    }

    /// Profile rows that were already parsed (possibly merged from several files).
    ///
    /// Fails with `MalformedInput` when the amounts sum past what a `Decimal`
    /// can hold.
    pub fn profile(&self, parsed: &ParsedBilling) -> Result<CostProfile> {
        let records = &parsed.records;

        let total = checked_sum(records.iter().map(|r| r.amount))
            .ok_or_else(|| OptiscaleError::malformed("total spend is out of range"))?;
        let untagged_total = checked_sum(
            records
                .iter()
                .filter(|r| !r.is_tagged())
                .map(|r| r.amount),
        )
        .ok_or_else(|| OptiscaleError::malformed("untagged spend is out of range"))?;

        let by_service =
            Self::ranked(Self::group(records, |r| Some(r.service.clone()))?, total)?;
        let by_account = Self::ranked(
            Self::group(records, |r| Some(r.account_or_project.clone()))?,
            total,
        )?;

        let mut by_period = Self::group(records, |r| r.period.as_ref().map(|p| p.to_string()))?;
        by_period.sort_by(|a, b| a.name.cmp(&b.name));
        Self::fill_shares(&mut by_period, total)?;

        tracing::debug!(
            rows = records.len(),
            services = by_service.len(),
            accounts = by_account.len(),
            %total,
            "built cost profile"
        );

        Ok(CostProfile {
            currency: self.currency.clone(),
            cloud_provider: self.cloud_provider.clone(),
            row_count: records.len() as u64,
            total,
            by_service,
            by_account,
            by_period,
            untagged_total,
            detected_columns: parsed.detected_columns.clone(),
            amount_column: parsed.amount_column.clone(),
        })
    }

    /// Sum amounts per key; rows with no key are skipped
    fn group<F>(records: &[CostRecord], key: F) -> Result<Vec<CostBucket>>
    where
        F: Fn(&CostRecord) -> Option<String>,
    {
        let mut map: HashMap<String, CostBucket> = HashMap::new();
        for record in records {
            if let Some(name) = key(record) {
                map.entry(name.clone())
                    .or_insert_with(|| CostBucket::new(name))
                    .add(record.amount)?;
            }
        }
        Ok(map.into_values().collect())
    }

    /// Sort by total descending (ties by name) and fill in shares
    fn ranked(mut buckets: Vec<CostBucket>, total: Decimal) -> Result<Vec<CostBucket>> {
        buckets.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Self::fill_shares(&mut buckets, total)?;
        Ok(buckets)
    }

    fn fill_shares(buckets: &mut [CostBucket], total: Decimal) -> Result<()> {
        for bucket in buckets {
            bucket.share_percent = percent_of(bucket.total, total)?;
        }
        Ok(())
    }
}

impl Default for CostProfiler {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Profile CSV text with default currency and provider
pub fn load_and_profile(csv_text: &str) -> Result<CostProfile> {
    CostProfiler::default().load_and_profile(csv_text)
}
