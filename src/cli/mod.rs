mod report;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::parsers::{expand_paths, ParserRegistry};
use crate::services::{
    build_summary_outline_with, compare_scenarios, compare_two_scenarios, estimate_savings,
    exec_summary_outline, project_savings, CostProfiler,
};
use crate::tools::ToolRegistry;
use crate::types::{CostProfile, OptimizationAction};

/// Cloud cost profiling and savings math for FinOps assistants
#[derive(Parser, Debug)]
#[command(name = "optiscale")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: ~/.optiscale/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Billing files plus per-run overrides of the settings file
#[derive(Args, Debug)]
struct BillingOpts {
    /// Billing exports (CSV, or TSV by extension); glob patterns allowed
    #[arg(required = true, value_name = "FILES")]
    files: Vec<String>,

    /// Currency code reported with the profile
    #[arg(long)]
    currency: Option<String>,

    /// Cloud provider label
    #[arg(long)]
    provider: Option<String>,

    /// Number of top services/accounts listed by `profile` and `outline`
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile spend by service, account and period
    Profile {
        #[command(flatten)]
        bill: BillingOpts,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate the saving of each optimization action
    Savings {
        #[command(flatten)]
        bill: BillingOpts,

        /// JSON file with an array of actions (or {"actions": [...]})
        #[arg(long, value_name = "PATH")]
        actions: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare baseline and optimized totals after applying actions
    Scenario {
        #[command(flatten)]
        bill: BillingOpts,

        /// JSON file with an array of actions (or {"actions": [...]})
        #[arg(long, value_name = "PATH")]
        actions: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Structural summary outline of a bill and optional actions
    Outline {
        #[command(flatten)]
        bill: BillingOpts,

        /// JSON file with an array of actions (or {"actions": [...]})
        #[arg(long, value_name = "PATH")]
        actions: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Project monthly and annual savings of a flat reduction
    Project {
        /// Current monthly spend
        #[arg(long)]
        baseline: Decimal,

        /// Expected reduction as a fraction (0.2 = 20%)
        #[arg(long)]
        reduction: Decimal,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two alternative plans against a baseline cost
    Compare {
        /// Current cost
        #[arg(long)]
        baseline: Decimal,

        /// Cost under scenario A
        #[arg(long = "a", value_name = "COST")]
        scenario_a: Decimal,

        /// Cost under scenario B
        #[arg(long = "b", value_name = "COST")]
        scenario_b: Decimal,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Executive summary skeleton for a goal
    ExecOutline {
        /// e.g. "Reduce EC2 spend by 30% in 3 months"
        #[arg(long)]
        goal: String,

        /// cxo, engineering, finance, ...
        #[arg(long)]
        audience: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or invoke the agent tools
    Tools {
        #[command(subcommand)]
        action: ToolsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print tool definitions as JSON
    List,

    /// Call a tool with JSON arguments and print the JSON result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,

        /// Read `csv_text` from this file instead of the JSON arguments
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
}

/// Actions file: a bare array or an object with an `actions` field
#[derive(Deserialize)]
#[serde(untagged)]
enum ActionsFile {
    List(Vec<OptimizationAction>),
    Wrapped { actions: Vec<OptimizationAction> },
}

fn read_actions(path: &Path) -> anyhow::Result<Vec<OptimizationAction>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read actions file {}", path.display()))?;
    let file: ActionsFile = serde_json::from_str(&text)
        .with_context(|| format!("invalid actions file {}", path.display()))?;
    Ok(match file {
        ActionsFile::List(actions) | ActionsFile::Wrapped { actions } => actions,
    })
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

impl Cli {
    /// Initialise stderr logging; `RUST_LOG` directives take precedence
    pub fn init_logging(&self) -> anyhow::Result<()> {
        let level = if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };

        let directive = format!("optiscale={}", level.as_str().to_ascii_lowercase());
        let filter = EnvFilter::builder()
            .with_default_directive(directive.parse()?)
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.verbose >= 2)
            .try_init()
            .map_err(|e| anyhow::anyhow!("cannot initialise logging: {}", e))
    }

    pub fn run(self) -> anyhow::Result<()> {
        let out = self.execute()?;
        print!("{}", out);
        Ok(())
    }

    /// Run the command and return what would be printed
    fn execute(self) -> anyhow::Result<String> {
        let settings = Settings::load(self.config.as_deref())?;

        match self.command {
            Commands::Profile { bill, json } => {
                let (profile, settings) = load_profile(&bill, settings)?;
                if json {
                    to_json(&profile)
                } else {
                    Ok(report::render_profile(&profile, settings.top_n))
                }
            }
            Commands::Savings {
                bill,
                actions,
                json,
            } => {
                let actions = read_actions(&actions)?;
                let (profile, _) = load_profile(&bill, settings)?;
                let estimates = estimate_savings(&actions, &profile)?;
                if json {
                    to_json(&estimates)
                } else {
                    Ok(report::render_estimates(&estimates, &profile.currency))
                }
            }
            Commands::Scenario {
                bill,
                actions,
                json,
            } => {
                let actions = read_actions(&actions)?;
                let (profile, _) = load_profile(&bill, settings)?;
                let cmp = compare_scenarios(&profile, &actions)?;
                if json {
                    to_json(&cmp)
                } else {
                    Ok(report::render_comparison(&cmp, &profile.currency))
                }
            }
            Commands::Outline {
                bill,
                actions,
                json,
            } => {
                let actions = match actions {
                    Some(path) => read_actions(&path)?,
                    None => Vec::new(),
                };
                let (profile, settings) = load_profile(&bill, settings)?;
                let cmp = compare_scenarios(&profile, &actions)?;
                let outline = build_summary_outline_with(&profile, &cmp, settings.top_n)?;
                if json {
                    to_json(&outline)
                } else {
                    Ok(report::render_outline(&outline))
                }
            }
            Commands::Project {
                baseline,
                reduction,
                json,
            } => {
                let projection = project_savings(baseline, reduction)?;
                if json {
                    to_json(&projection)
                } else {
                    Ok(report::render_projection(&projection, &settings.currency))
                }
            }
            Commands::Compare {
                baseline,
                scenario_a,
                scenario_b,
                json,
            } => {
                let cmp = compare_two_scenarios(baseline, scenario_a, scenario_b)?;
                if json {
                    to_json(&cmp)
                } else {
                    Ok(report::render_two_scenarios(&cmp, &settings.currency))
                }
            }
            Commands::ExecOutline {
                goal,
                audience,
                json,
            } => {
                let outline = exec_summary_outline(&goal, audience.as_deref());
                if json {
                    to_json(&outline)
                } else {
                    Ok(report::render_outline(&outline))
                }
            }
            Commands::Tools { action } => {
                let registry = ToolRegistry::new(settings);
                match action {
                    ToolsCommand::List => to_json(&registry.definitions()),
                    ToolsCommand::Call { name, args, csv } => {
                        let mut args: serde_json::Value =
                            serde_json::from_str(&args).context("tool arguments must be JSON")?;
                        if let Some(path) = csv {
                            let text = std::fs::read_to_string(&path)
                                .with_context(|| format!("cannot read {}", path.display()))?;
                            let obj = args
                                .as_object_mut()
                                .context("tool arguments must be a JSON object")?;
                            obj.insert("csv_text".into(), text.into());
                        }
                        to_json(&registry.call(&name, args)?)
                    }
                }
            }
        }
    }
}

/// Parse and merge the billing files, applying per-run overrides
fn load_profile(
    bill: &BillingOpts,
    settings: Settings,
) -> anyhow::Result<(CostProfile, Settings)> {
    let settings =
        settings.with_overrides(bill.currency.clone(), bill.provider.clone(), bill.top)?;
    let paths = expand_paths(&bill.files);
    if paths.is_empty() {
        anyhow::bail!("no billing files matched {:?}", bill.files);
    }
    tracing::info!(files = paths.len(), "loading billing exports");

    let parsed = ParserRegistry::new().parse_files(&paths)?;
    let profile = CostProfiler::from_settings(&settings).profile(&parsed)?;
    Ok((profile, settings))
}
