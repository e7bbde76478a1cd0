//! Savings estimation and scenario comparison
//!
//! Estimates are rough by nature: each action is priced against the current
//! total of the service it targets and never allowed to save more than that
//! service costs today.

use crate::services::money::{checked_sum, percent_of};
use crate::types::{
    CostBucket, CostProfile, OptiscaleError, OptimizationAction, Result, SavingsEstimate,
    SavingsLever, SavingsProjection, ScenarioComparison, ScenarioDelta, TwoScenarioComparison,
};
use rust_decimal::Decimal;

const MONTHS_PER_YEAR: u32 = 12;

/// Match an action's target to a service bucket: exact first, then
/// case-insensitive.
fn match_service<'a>(profile: &'a CostProfile, target: &str) -> Result<&'a CostBucket> {
    if let Some(bucket) = profile.service(target) {
        return Ok(bucket);
    }
    let target = target.trim();
    let bucket = profile
        .by_service
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(target))
        .ok_or_else(|| OptiscaleError::UnknownService(target.to_string()))?;
    tracing::debug!(
        requested = target,
        matched = %bucket.name,
        "service matched case-insensitively"
    );
    Ok(bucket)
}

fn validate_lever(action: &OptimizationAction) -> Result<()> {
    match action.lever {
        SavingsLever::PercentReduction(p) if p < Decimal::ZERO || p > Decimal::ONE => {
            Err(OptiscaleError::InvalidArgument(format!(
                "action '{}': percent_reduction must be a fraction in [0, 1], got {}",
                action.name, p
            )))
        }
        SavingsLever::AbsoluteSaving(a) if a < Decimal::ZERO => {
            Err(OptiscaleError::InvalidArgument(format!(
                "action '{}': absolute_saving cannot be negative, got {}",
                action.name, a
            )))
        }
        _ => Ok(()),
    }
}

/// Estimate the saving of each action against the profile.
///
/// Saving is `fraction × service total` or the absolute figure, capped at the
/// service total. Fails on the first action whose service is not in the
/// profile.
pub fn estimate_savings(
    actions: &[OptimizationAction],
    profile: &CostProfile,
) -> Result<Vec<SavingsEstimate>> {
    actions
        .iter()
        .map(|action| {
            validate_lever(action)?;
            let bucket = match_service(profile, &action.target_service)?;

            let raw = match action.lever {
                SavingsLever::PercentReduction(p) => p * bucket.total,
                SavingsLever::AbsoluteSaving(a) => a,
            };
            let capped = raw > bucket.total;
            if capped {
                tracing::warn!(
                    action = %action.name,
                    service = %bucket.name,
                    requested = %raw,
                    cap = %bucket.total,
                    "saving exceeds service total, capping"
                );
            }

            Ok(SavingsEstimate {
                action: action.clone(),
                matched_service: bucket.name.clone(),
                service_total: bucket.total,
                estimated_saving: raw.min(bucket.total),
                capped,
            })
        })
        .collect()
}

/// Apply all actions to the profile total.
///
/// `total_savings` is the plain sum of estimates; `delta` is what is actually
/// realised once the optimized total is clamped at zero.
pub fn compare_scenarios(
    profile: &CostProfile,
    actions: &[OptimizationAction],
) -> Result<ScenarioComparison> {
    let estimates = estimate_savings(actions, profile)?;
    let baseline_total = profile.total;
    let total_savings = checked_sum(estimates.iter().map(|e| e.estimated_saving))
        .ok_or_else(|| OptiscaleError::InvalidArgument("total savings are out of range".into()))?;

    let unclamped = baseline_total - total_savings;
    let clamped = unclamped < Decimal::ZERO;
    if clamped {
        tracing::warn!(
            baseline = %baseline_total,
            savings = %total_savings,
            "actions over-apply the baseline, clamping optimized total to zero"
        );
    }
    let optimized_total = unclamped.max(Decimal::ZERO);
    let delta = baseline_total - optimized_total;

    Ok(ScenarioComparison {
        baseline_total,
        total_savings,
        optimized_total,
        delta,
        percent_improvement: percent_of(delta, baseline_total)?,
        clamped,
        estimates,
    })
}

/// Monthly and annual savings of a flat reduction on a monthly baseline
pub fn project_savings(
    baseline_monthly_cost: Decimal,
    reduction_fraction: Decimal,
) -> Result<SavingsProjection> {
    if baseline_monthly_cost < Decimal::ZERO {
        return Err(OptiscaleError::InvalidArgument(
            "baseline_monthly_cost cannot be negative".into(),
        ));
    }
    if reduction_fraction < Decimal::ZERO || reduction_fraction > Decimal::ONE {
        return Err(OptiscaleError::InvalidArgument(format!(
            "reduction must be a fraction in [0, 1], got {}",
            reduction_fraction
        )));
    }

    let out_of_range = || {
        OptiscaleError::InvalidArgument(format!(
            "projected savings for baseline {} are out of range",
            baseline_monthly_cost
        ))
    };
    let monthly_savings = baseline_monthly_cost
        .checked_mul(reduction_fraction)
        .ok_or_else(out_of_range)?;
    let projected_annual_savings = monthly_savings
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or_else(out_of_range)?;

    Ok(SavingsProjection {
        baseline_monthly_cost,
        reduction_fraction,
        monthly_savings,
        projected_annual_savings,
    })
}

/// Compare two alternative plans against one baseline. A scenario that costs
/// more than the baseline yields a negative delta.
pub fn compare_two_scenarios(
    baseline_cost: Decimal,
    scenario_a_cost: Decimal,
    scenario_b_cost: Decimal,
) -> Result<TwoScenarioComparison> {
    if baseline_cost <= Decimal::ZERO {
        return Err(OptiscaleError::InvalidArgument(
            "baseline_cost must be > 0 for a meaningful comparison".into(),
        ));
    }
    if scenario_a_cost < Decimal::ZERO || scenario_b_cost < Decimal::ZERO {
        return Err(OptiscaleError::InvalidArgument(
            "scenario costs cannot be negative".into(),
        ));
    }

    let measure = |cost: Decimal| -> Result<ScenarioDelta> {
        let delta = baseline_cost.checked_sub(cost).ok_or_else(|| {
            OptiscaleError::InvalidArgument(format!("scenario cost {} is out of range", cost))
        })?;
        Ok(ScenarioDelta {
            cost,
            delta,
            savings_percent: percent_of(delta, baseline_cost)?,
        })
    };

    Ok(TwoScenarioComparison {
        baseline_cost,
        scenario_a: measure(scenario_a_cost)?,
        scenario_b: measure(scenario_b_cost)?,
    })
}
