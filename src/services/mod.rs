//! Services for cost profiling, savings math and outlining

pub mod money;
pub mod normalizer;
pub mod outline;
pub mod profiler;
pub mod savings;

pub use normalizer::normalize_column_name;
pub use outline::{build_summary_outline, build_summary_outline_with, exec_summary_outline};
pub use profiler::{load_and_profile, CostProfiler};
pub use savings::{compare_scenarios, compare_two_scenarios, estimate_savings, project_savings};
