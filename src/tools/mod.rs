//! Tool system for the agent host.
//!
//! Each tool wraps one deterministic operation: JSON arguments in, JSON
//! result out. The host lists [`ToolRegistry::definitions`] to the model and
//! forwards the model's calls to [`ToolRegistry::call`].

mod outline;
mod profile;
mod savings;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::services::CostProfiler;
use crate::types::{CostProfile, OptiscaleError, Result};

/// Definition of a tool as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait for implementing tools.
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    fn execute(&self, args: Value) -> Result<Value>;
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new registry with all default tools.
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        // Bill analysis
        registry.register(Arc::new(profile::LoadAndProfileCosts::new(settings.clone())));
        registry.register(Arc::new(savings::EstimateSavingsFromActions::new(
            settings.clone(),
        )));
        registry.register(Arc::new(savings::CompareCostScenarios::new(settings.clone())));
        registry.register(Arc::new(outline::GenerateSummaryOutline::new(settings)));

        // Quick what-if math
        registry.register(Arc::new(savings::ProjectSavings));
        registry.register(Arc::new(savings::CompareTwoCostScenarios));
        registry.register(Arc::new(outline::GenerateExecSummaryOutline));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of all tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Run a tool by name.
    pub fn call(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| OptiscaleError::UnknownTool(name.to_string()))?;
        tracing::debug!(tool = name, "executing tool");
        tool.execute(args).inspect_err(|e| {
            tracing::warn!(tool = name, error = %e, "tool call failed");
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Decode tool arguments, reporting schema mismatches as invalid arguments
fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    // Hosts sometimes send `null` for tools without required arguments
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| OptiscaleError::InvalidArgument(format!("{}: {}", tool, e)))
}

/// Billing text plus optional per-call overrides of the configured labels
#[derive(Debug, Deserialize)]
struct BillingArgs {
    csv_text: String,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    cloud_provider: Option<String>,
}

impl BillingArgs {
    fn profile(&self, settings: &Settings) -> Result<CostProfile> {
        let currency = self.currency.as_deref().unwrap_or(&settings.currency);
        let provider = self
            .cloud_provider
            .as_deref()
            .unwrap_or(&settings.cloud_provider);
        CostProfiler::new(currency.trim().to_ascii_uppercase(), provider.trim())
            .load_and_profile(&self.csv_text)
    }
}

/// Schema fragment shared by every tool that takes billing text
fn billing_properties() -> serde_json::Map<String, Value> {
    let schema = serde_json::json!({
        "csv_text": {
            "type": "string",
            "description": "Full billing CSV including the header row. Needs a service (or product) column and an amount (or *cost*) column; account/project, tags and period columns are optional."
        },
        "currency": {
            "type": "string",
            "description": "3-letter currency code, e.g. USD, EUR, INR"
        },
        "cloud_provider": {
            "type": "string",
            "description": "Provider label, e.g. aws, gcp, azure"
        }
    });
    match schema {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Schema of an optimization action list
fn actions_schema() -> Value {
    serde_json::json!({
        "type": "array",
        "description": "Optimization levers to price against the bill",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "target_service": { "type": "string", "description": "Service name as it appears in the profile" },
                "percent_reduction": { "type": "number", "description": "Fraction of the service total, 0.2 = 20%" },
                "absolute_saving": { "type": "number", "description": "Fixed saving in profile currency" }
            },
            "required": ["target_service"]
        }
    })
}
