//! Summary outlines for downstream narration
//!
//! Outlines are structure only: ordered headings and bullet data the model
//! turns into prose. Nothing here writes sentences for the reader.

use crate::services::money::{format_money, percent_of};
use crate::types::{
    CostBucket, CostProfile, OutlineSection, Result, ScenarioComparison, SummaryOutline,
    UNASSIGNED_ACCOUNT,
};

/// Number of services/accounts listed as top drivers
pub const DEFAULT_TOP_DRIVERS: usize = 5;

pub const DEFAULT_AUDIENCE: &str = "cxo";

/// Outline of a profiled bill and a scenario, with the default driver count
pub fn build_summary_outline(
    profile: &CostProfile,
    comparison: &ScenarioComparison,
) -> Result<SummaryOutline> {
    build_summary_outline_with(profile, comparison, DEFAULT_TOP_DRIVERS)
}

/// Sections, in order: Cost Overview, Top Cost Drivers, Top Accounts,
/// Savings Opportunities, Scenario Impact, Governance. Top Accounts is left
/// out when every row is unassigned; Governance when all spend is tagged.
pub fn build_summary_outline_with(
    profile: &CostProfile,
    comparison: &ScenarioComparison,
    top_n: usize,
) -> Result<SummaryOutline> {
    let money = |v| format_money(v, &profile.currency);
    let mut sections = Vec::new();

    let mut overview = OutlineSection::new("Cost Overview")
        .bullet(format!("Total spend: {}", money(profile.total)))
        .bullet(format!("Line items: {}", profile.row_count))
        .bullet(format!("Cloud provider: {}", profile.cloud_provider));
    if let (Some(first), Some(last)) = (profile.by_period.first(), profile.by_period.last()) {
        overview = overview.bullet(format!("Periods covered: {} to {}", first.name, last.name));
    }
    sections.push(overview);

    sections.push(drivers_section(
        "Top Cost Drivers",
        profile.top_services(top_n),
        &profile.currency,
    ));

    let only_unassigned = profile
        .by_account
        .iter()
        .all(|b| b.name == UNASSIGNED_ACCOUNT);
    if !only_unassigned {
        sections.push(drivers_section(
            "Top Accounts",
            profile.top_accounts(top_n),
            &profile.currency,
        ));
    }

    let mut opportunities = OutlineSection::new("Savings Opportunities");
    if comparison.estimates.is_empty() {
        opportunities = opportunities.bullet("No optimization actions evaluated");
    }
    let mut ranked: Vec<_> = comparison.estimates.iter().collect();
    ranked.sort_by(|a, b| b.estimated_saving.cmp(&a.estimated_saving));
    for estimate in ranked {
        let mut line = format!(
            "{} ({}): {}",
            estimate.action.name,
            estimate.matched_service,
            money(estimate.estimated_saving)
        );
        if estimate.capped {
            line.push_str(" [capped at service total]");
        }
        opportunities = opportunities.bullet(line);
    }
    sections.push(opportunities);

    let mut impact = OutlineSection::new("Scenario Impact")
        .bullet(format!("Baseline: {}", money(comparison.baseline_total)))
        .bullet(format!("Optimized: {}", money(comparison.optimized_total)))
        .bullet(format!(
            "Savings: {} ({}%)",
            money(comparison.delta),
            comparison.percent_improvement
        ));
    if comparison.clamped {
        impact = impact.bullet("Actions exceed baseline; optimized total clamped to zero");
    }
    sections.push(impact);

    if !profile.untagged_total.is_zero() {
        sections.push(OutlineSection::new("Governance").bullet(format!(
            "Untagged spend: {} ({}%)",
            money(profile.untagged_total),
            percent_of(profile.untagged_total, profile.total)?
        )));
    }

    Ok(SummaryOutline {
        title: "Cloud Cost Optimization Summary".into(),
        audience: DEFAULT_AUDIENCE.into(),
        goal: None,
        sections,
    })
}

fn drivers_section(heading: &str, buckets: &[CostBucket], currency: &str) -> OutlineSection {
    buckets
        .iter()
        .fold(OutlineSection::new(heading), |section, b| {
            section.bullet(format!(
                "{}: {} ({}%)",
                b.name,
                format_money(b.total, currency),
                b.share_percent
            ))
        })
}

/// Fixed executive-summary skeleton for a stated goal and audience
pub fn exec_summary_outline(goal: &str, audience: Option<&str>) -> SummaryOutline {
    let audience = audience
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AUDIENCE);

    let sections = vec![
        OutlineSection::new("1. Context & Objectives")
            .bullet("Current cloud cost baseline and growth trend")
            .bullet(format!("Primary goal: {}", goal.trim()))
            .bullet("Time horizon, acceptable risk and constraints"),
        OutlineSection::new("2. Key Cost Drivers")
            .bullet("Top 5 services/projects by spend")
            .bullet("Patterns by environment (prod, non-prod) and region")
            .bullet("Anomalous spikes or waste patterns"),
        OutlineSection::new("3. Recommended Optimization Levers")
            .bullet("Rightsizing and decommissioning opportunities")
            .bullet("Commitment-based discounts (Savings Plans / CUDs / Reservations)")
            .bullet("Storage and data transfer optimizations")
            .bullet("Governance and tagging improvements"),
        OutlineSection::new("4. Impact & Timeline")
            .bullet("Estimated monthly and annual savings (ranges)")
            .bullet("Phased rollout plan")
            .bullet("Risks, dependencies and owners"),
        OutlineSection::new("5. Next Steps")
            .bullet("Decisions required from leadership")
            .bullet("Initial actions for engineering / platform teams")
            .bullet("How success is tracked and reported"),
    ];

    SummaryOutline {
        title: "Cloud Cost Optimization - Executive Summary".into(),
        audience: audience.to_string(),
        goal: Some(goal.trim().to_string()),
        sections,
    }
}
