use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{actions_schema, billing_properties, parse_args, BillingArgs, Tool};
use crate::config::Settings;
use crate::services::money::{checked_sum, round_money};
use crate::services::{compare_scenarios, compare_two_scenarios, estimate_savings, project_savings};
use crate::types::{
    OptimizationAction, OptiscaleError, Result, SavingsEstimate, SavingsProjection,
    ScenarioComparison, ScenarioDelta, TwoScenarioComparison,
};

#[derive(Debug, Deserialize)]
struct ActionArgs {
    #[serde(flatten)]
    billing: BillingArgs,
    actions: Vec<OptimizationAction>,
}

fn billing_with_actions_schema() -> Value {
    let mut properties = billing_properties();
    properties.insert("actions".into(), actions_schema());
    json!({
        "type": "object",
        "properties": properties,
        "required": ["csv_text", "actions"]
    })
}

// Tool output carries money rounded to cents, like the profile tool. Action
// levers are echoed as given.

fn rounded_estimate(e: SavingsEstimate) -> SavingsEstimate {
    SavingsEstimate {
        service_total: round_money(e.service_total),
        estimated_saving: round_money(e.estimated_saving),
        ..e
    }
}

fn rounded_comparison(c: ScenarioComparison) -> ScenarioComparison {
    ScenarioComparison {
        baseline_total: round_money(c.baseline_total),
        total_savings: round_money(c.total_savings),
        optimized_total: round_money(c.optimized_total),
        delta: round_money(c.delta),
        estimates: c.estimates.into_iter().map(rounded_estimate).collect(),
        ..c
    }
}

fn rounded_projection(p: SavingsProjection) -> SavingsProjection {
    SavingsProjection {
        baseline_monthly_cost: round_money(p.baseline_monthly_cost),
        monthly_savings: round_money(p.monthly_savings),
        projected_annual_savings: round_money(p.projected_annual_savings),
        ..p
    }
}

fn rounded_delta(d: ScenarioDelta) -> ScenarioDelta {
    ScenarioDelta {
        cost: round_money(d.cost),
        delta: round_money(d.delta),
        ..d
    }
}

/// Price each optimization action against the bill.
pub struct EstimateSavingsFromActions {
    settings: Arc<Settings>,
}

impl EstimateSavingsFromActions {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Tool for EstimateSavingsFromActions {
    fn name(&self) -> &str {
        "estimate_savings_from_actions"
    }

    fn description(&self) -> &str {
        "Estimate the saving of each proposed action (percent of a service's spend, or a fixed amount). \
         Savings are capped at the current spend of the targeted service. Numbers are estimates."
    }

    fn parameters_schema(&self) -> Value {
        billing_with_actions_schema()
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: ActionArgs = parse_args(self.name(), args)?;
        let profile = args.billing.profile(&self.settings)?;
        let estimates = estimate_savings(&args.actions, &profile)?;
        let total = checked_sum(estimates.iter().map(|e| e.estimated_saving)).ok_or_else(|| {
            OptiscaleError::InvalidArgument("total estimated savings are out of range".into())
        })?;
        let estimates: Vec<_> = estimates.into_iter().map(rounded_estimate).collect();
        Ok(json!({
            "currency": profile.currency,
            "estimates": estimates,
            "total_estimated_savings": round_money(total),
        }))
    }
}

/// Baseline vs. optimized bill after applying all actions.
pub struct CompareCostScenarios {
    settings: Arc<Settings>,
}

impl CompareCostScenarios {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Tool for CompareCostScenarios {
    fn name(&self) -> &str {
        "compare_cost_scenarios"
    }

    fn description(&self) -> &str {
        "Apply all proposed actions to the bill and report baseline total, optimized total, \
         delta and percent improvement. The optimized total never drops below zero."
    }

    fn parameters_schema(&self) -> Value {
        billing_with_actions_schema()
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: ActionArgs = parse_args(self.name(), args)?;
        let profile = args.billing.profile(&self.settings)?;
        let comparison = compare_scenarios(&profile, &args.actions)?;
        Ok(serde_json::to_value(rounded_comparison(comparison))?)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectArgs {
    baseline_monthly_cost: Decimal,
    reduction_fraction: Decimal,
}

/// Monthly/annual projection of a flat reduction.
pub struct ProjectSavings;

impl Tool for ProjectSavings {
    fn name(&self) -> &str {
        "project_savings"
    }

    fn description(&self) -> &str {
        "Project monthly and annual savings from a monthly baseline and an expected reduction \
         fraction (0.2 = 20%). Use for rough what-if numbers when no bill is available."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "baseline_monthly_cost": { "type": "number", "description": "Current monthly spend, e.g. 15000" },
                "reduction_fraction": { "type": "number", "description": "Expected reduction as a fraction in [0, 1]" }
            },
            "required": ["baseline_monthly_cost", "reduction_fraction"]
        })
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: ProjectArgs = parse_args(self.name(), args)?;
        let projection = project_savings(args.baseline_monthly_cost, args.reduction_fraction)?;
        Ok(serde_json::to_value(rounded_projection(projection))?)
    }
}

#[derive(Debug, Deserialize)]
struct TwoScenarioArgs {
    baseline_cost: Decimal,
    scenario_a_cost: Decimal,
    scenario_b_cost: Decimal,
}

/// Two alternative plans against one baseline.
pub struct CompareTwoCostScenarios;

impl Tool for CompareTwoCostScenarios {
    fn name(&self) -> &str {
        "compare_two_cost_scenarios"
    }

    fn description(&self) -> &str {
        "Compare a baseline cost with two alternative scenarios (e.g. rightsizing only vs. \
         rightsizing plus reservations) and report each delta and savings percent."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "baseline_cost": { "type": "number" },
                "scenario_a_cost": { "type": "number" },
                "scenario_b_cost": { "type": "number" }
            },
            "required": ["baseline_cost", "scenario_a_cost", "scenario_b_cost"]
        })
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: TwoScenarioArgs = parse_args(self.name(), args)?;
        let cmp = compare_two_scenarios(
            args.baseline_cost,
            args.scenario_a_cost,
            args.scenario_b_cost,
        )?;
        Ok(serde_json::to_value(TwoScenarioComparison {
            baseline_cost: round_money(cmp.baseline_cost),
            scenario_a: rounded_delta(cmp.scenario_a),
            scenario_b: rounded_delta(cmp.scenario_b),
        })?)
    }
}
