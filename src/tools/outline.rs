use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{actions_schema, billing_properties, parse_args, BillingArgs, Tool};
use crate::config::Settings;
use crate::services::{build_summary_outline, compare_scenarios, exec_summary_outline};
use crate::types::{OptimizationAction, Result};

#[derive(Debug, Deserialize)]
struct SummaryArgs {
    #[serde(flatten)]
    billing: BillingArgs,
    #[serde(default)]
    actions: Vec<OptimizationAction>,
}

/// Structural outline of a profiled bill and its savings scenario.
pub struct GenerateSummaryOutline {
    settings: Arc<Settings>,
}

impl GenerateSummaryOutline {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Tool for GenerateSummaryOutline {
    fn name(&self) -> &str {
        "generate_summary_outline"
    }

    fn description(&self) -> &str {
        "Build ordered section headings and bullet data (top drivers, savings per action, \
         scenario impact, untagged spend) from a bill and optional actions. Expand the outline \
         into prose for the reader; do not change its numbers."
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = billing_properties();
        properties.insert("actions".into(), actions_schema());
        json!({
            "type": "object",
            "properties": properties,
            "required": ["csv_text"]
        })
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: SummaryArgs = parse_args(self.name(), args)?;
        let profile = args.billing.profile(&self.settings)?;
        let comparison = compare_scenarios(&profile, &args.actions)?;
        let outline = build_summary_outline(&profile, &comparison)?;
        Ok(serde_json::to_value(outline)?)
    }
}

#[derive(Debug, Deserialize)]
struct ExecArgs {
    goal: String,
    #[serde(default)]
    audience: Option<String>,
}

/// Fixed executive-summary skeleton for a stated goal.
pub struct GenerateExecSummaryOutline;

impl Tool for GenerateExecSummaryOutline {
    fn name(&self) -> &str {
        "generate_exec_summary_outline"
    }

    fn description(&self) -> &str {
        "Return a five-section executive summary skeleton for a stated goal and audience \
         (cxo, engineering, finance). Fill each bullet in with figures from the other tools."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "goal": { "type": "string", "description": "e.g. Reduce EC2 spend by 30% in 3 months without impacting SLAs" },
                "audience": { "type": "string", "description": "Target persona, default cxo" }
            },
            "required": ["goal"]
        })
    }

    fn execute(&self, args: Value) -> Result<Value> {
        let args: ExecArgs = parse_args(self.name(), args)?;
        Ok(serde_json::to_value(exec_summary_outline(
            &args.goal,
            args.audience.as_deref(),
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::ToolRegistry;
    use serde_json::json;

    #[test]
    fn test_summary_outline_tool_without_actions() {
        let out = ToolRegistry::default()
            .call(
                "generate_summary_outline",
                json!({ "csv_text": "service,amount\ncompute,100\nstorage,50\ncompute,25\n" }),
            )
            .unwrap();

        assert_eq!(out["sections"][0]["heading"], "Cost Overview");
        assert_eq!(out["sections"][1]["bullets"][0], "compute: USD 125.00 (71.43%)");
        assert!(out.get("goal").is_none());
    }

    #[test]
    fn test_exec_outline_tool() {
        let out = ToolRegistry::default()
            .call(
                "generate_exec_summary_outline",
                json!({ "goal": "Halve storage spend", "audience": "finance" }),
            )
            .unwrap();

        assert_eq!(out["audience"], "finance");
        assert_eq!(out["goal"], "Halve storage spend");
        assert_eq!(out["sections"].as_array().unwrap().len(), 5);
    }
}
