//! Plain-text rendering of results for terminal output

use std::fmt::Write;

use crate::services::money::{checked_sum, format_money, format_share_bar, round_money};
use crate::types::{
    CostBucket, CostProfile, SavingsEstimate, SavingsProjection, ScenarioComparison,
    SummaryOutline, TwoScenarioComparison,
};

/// Width of the share bar next to each bucket
const BAR_WIDTH: usize = 20;

fn bucket_table(out: &mut String, title: &str, buckets: &[CostBucket], currency: &str) {
    if buckets.is_empty() {
        return;
    }
    let name_width = buckets.iter().map(|b| b.name.len()).max().unwrap_or(0).max(8);

    let _ = writeln!(out, "\n{}", title);
    for b in buckets {
        let _ = writeln!(
            out,
            "  {:<name_width$}  {:>18}  {} {:>6}%",
            b.name,
            format_money(b.total, currency),
            format_share_bar(b.share_percent, BAR_WIDTH),
            b.share_percent,
        );
    }
}

pub fn render_profile(profile: &CostProfile, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total spend: {} across {} rows ({}, cost column '{}')",
        format_money(profile.total, &profile.currency),
        profile.row_count,
        profile.cloud_provider,
        profile.amount_column
    );

    bucket_table(
        &mut out,
        "By service",
        profile.top_services(top_n),
        &profile.currency,
    );
    if profile.by_service.len() > top_n {
        let _ = writeln!(out, "  ... {} more", profile.by_service.len() - top_n);
    }
    bucket_table(
        &mut out,
        "By account/project",
        profile.top_accounts(top_n),
        &profile.currency,
    );
    if profile.by_account.len() > top_n {
        let _ = writeln!(out, "  ... {} more", profile.by_account.len() - top_n);
    }
    bucket_table(&mut out, "By period", &profile.by_period, &profile.currency);

    if !profile.untagged_total.is_zero() {
        let _ = writeln!(
            out,
            "\nUntagged spend: {}",
            format_money(profile.untagged_total, &profile.currency)
        );
    }
    out
}

pub fn render_estimates(estimates: &[SavingsEstimate], currency: &str) -> String {
    let mut out = String::new();
    for e in estimates {
        let _ = writeln!(
            out,
            "{:<24} {:<16} {:>18} of {}{}",
            e.action.name,
            e.matched_service,
            format_money(e.estimated_saving, currency),
            format_money(e.service_total, currency),
            if e.capped { "  (capped)" } else { "" }
        );
    }
    match checked_sum(estimates.iter().map(|e| e.estimated_saving)) {
        Some(total) => {
            let _ = writeln!(out, "Total estimated savings: {}", format_money(total, currency));
        }
        None => {
            let _ = writeln!(out, "Total estimated savings: out of range");
        }
    }
    out
}

pub fn render_comparison(cmp: &ScenarioComparison, currency: &str) -> String {
    let mut out = render_estimates(&cmp.estimates, currency);
    let _ = writeln!(out);
    let _ = writeln!(out, "Baseline:   {}", format_money(cmp.baseline_total, currency));
    let _ = writeln!(out, "Optimized:  {}", format_money(cmp.optimized_total, currency));
    let _ = writeln!(
        out,
        "Delta:      {} ({}%)",
        format_money(cmp.delta, currency),
        cmp.percent_improvement
    );
    if cmp.clamped {
        let _ = writeln!(out, "Note: actions exceed the baseline; optimized total clamped to zero");
    }
    out
}

pub fn render_outline(outline: &SummaryOutline) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", outline.title);
    let _ = writeln!(out, "Audience: {}", outline.audience);
    if let Some(goal) = &outline.goal {
        let _ = writeln!(out, "Goal: {}", goal);
    }
    for section in &outline.sections {
        let _ = writeln!(out, "\n## {}", section.heading);
        for bullet in &section.bullets {
            let _ = writeln!(out, "- {}", bullet);
        }
    }
    out
}

pub fn render_projection(p: &SavingsProjection, currency: &str) -> String {
    format!(
        "Baseline (monthly): {}\nReduction:          {}%\nMonthly savings:    {}\nAnnual savings:     {}\n",
        format_money(p.baseline_monthly_cost, currency),
        round_money(p.reduction_fraction * rust_decimal::Decimal::ONE_HUNDRED),
        format_money(p.monthly_savings, currency),
        format_money(p.projected_annual_savings, currency),
    )
}

pub fn render_two_scenarios(cmp: &TwoScenarioComparison, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Baseline:   {}", format_money(cmp.baseline_cost, currency));
    for (label, s) in [("A", &cmp.scenario_a), ("B", &cmp.scenario_b)] {
        let _ = writeln!(
            out,
            "Scenario {}: {}  delta {} ({}%)",
            label,
            format_money(s.cost, currency),
            format_money(s.delta, currency),
            s.savings_percent
        );
    }
    out
}
