use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{billing_properties, parse_args, BillingArgs, Tool};
use crate::config::Settings;
use crate::services::money::round_money;
use crate::types::{CostBucket, CostProfile, Result};

/// Parse and profile a billing CSV.
pub struct LoadAndProfileCosts {
    settings: Arc<Settings>,
}

impl LoadAndProfileCosts {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Tool for LoadAndProfileCosts {
    fn name(&self) -> &str {
        "load_and_profile_costs"
    }

    fn description(&self) -> &str {
        "Parse raw billing CSV text and return totals by service, by account/project and by period. \
         Use this instead of reading the numbers yourself whenever the user provides billing data."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": billing_properties(),
            "required": ["csv_text"]
        })
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: BillingArgs = parse_args(self.name(), args)?;
        let profile = args.profile(&self.settings)?;
        Ok(profile_json(&profile, self.settings.top_n))
    }
}

fn bucket_map(buckets: &[CostBucket]) -> Map<String, Value> {
    buckets
        .iter()
        .map(|b| (b.name.clone(), json!(round_money(b.total))))
        .collect()
}

/// Tool-facing view of a profile: top-N maps plus the ordering the maps lose
pub(crate) fn profile_json(profile: &CostProfile, top_n: usize) -> Value {
    let top_services = profile.top_services(top_n);
    let top_accounts = profile.top_accounts(top_n);

    json!({
        "currency": profile.currency,
        "cloud_provider": profile.cloud_provider,
        "row_count": profile.row_count,
        "total_cost": round_money(profile.total),
        "cost_column": profile.amount_column,
        "cost_by_service": bucket_map(top_services),
        "top_services": top_services.iter().map(|b| &b.name).collect::<Vec<_>>(),
        "service_count": profile.by_service.len(),
        "cost_by_project": bucket_map(top_accounts),
        "top_projects": top_accounts.iter().map(|b| &b.name).collect::<Vec<_>>(),
        "project_count": profile.by_account.len(),
        "cost_by_period": bucket_map(&profile.by_period),
        "untagged_cost": round_money(profile.untagged_total),
        "detected_columns": profile.detected_columns,
    })
}
