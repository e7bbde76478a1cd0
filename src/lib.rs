//! Deterministic cloud cost profiling and savings math.
//!
//! The functions here are what an LLM FinOps assistant calls as tools:
//! profile a billing CSV, price optimization actions, compare scenarios and
//! outline a summary. The model narrates; this crate does the arithmetic.

pub mod cli;
pub mod config;
pub mod parsers;
pub mod services;
pub mod tools;
pub mod types;

pub use config::Settings;
pub use services::{
    build_summary_outline, compare_scenarios, estimate_savings, load_and_profile, CostProfiler,
};
pub use tools::ToolRegistry;
pub use types::{OptiscaleError, Result};
