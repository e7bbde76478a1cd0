//! Optimization actions and savings results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an action reduces spend on its target service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsLever {
    /// Fraction of the service total, in `[0, 1]` (0.20 = 20%)
    PercentReduction(Decimal),
    /// Fixed amount in profile currency
    AbsoluteSaving(Decimal),
}

/// A proposed optimization lever, supplied by the caller.
///
/// JSON form is flat: `{"name", "target_service", "percent_reduction"}` or
/// `{"name", "target_service", "absolute_saving"}`. `service` is accepted as
/// an alias for `target_service`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub struct OptimizationAction {
    pub name: String,
    pub target_service: String,
    pub lever: SavingsLever,
}

impl OptimizationAction {
    pub fn percent(name: &str, target_service: &str, fraction: Decimal) -> Self {
        Self {
            name: name.into(),
            target_service: target_service.into(),
            lever: SavingsLever::PercentReduction(fraction),
        }
    }

    pub fn absolute(name: &str, target_service: &str, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            target_service: target_service.into(),
            lever: SavingsLever::AbsoluteSaving(amount),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawAction {
    #[serde(default)]
    name: String,
    #[serde(alias = "service")]
    target_service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    percent_reduction: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    absolute_saving: Option<Decimal>,
}

impl TryFrom<RawAction> for OptimizationAction {
    type Error = String;

    fn try_from(raw: RawAction) -> std::result::Result<Self, Self::Error> {
        let lever = match (raw.percent_reduction, raw.absolute_saving) {
            (Some(p), None) => SavingsLever::PercentReduction(p),
            (None, Some(a)) => SavingsLever::AbsoluteSaving(a),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "action '{}' sets both percent_reduction and absolute_saving",
                    raw.name
                ))
            }
            (None, None) => {
                return Err(format!(
                    "action '{}' needs percent_reduction or absolute_saving",
                    raw.name
                ))
            }
        };
        let name = if raw.name.trim().is_empty() {
            raw.target_service.clone()
        } else {
            raw.name
        };
        Ok(Self {
            name,
            target_service: raw.target_service,
            lever,
        })
    }
}

impl From<OptimizationAction> for RawAction {
    fn from(action: OptimizationAction) -> Self {
        let (percent_reduction, absolute_saving) = match action.lever {
            SavingsLever::PercentReduction(p) => (Some(p), None),
            SavingsLever::AbsoluteSaving(a) => (None, Some(a)),
        };
        Self {
            name: action.name,
            target_service: action.target_service,
            percent_reduction,
            absolute_saving,
        }
    }
}

/// Estimated saving of one action against its matched service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsEstimate {
    pub action: OptimizationAction,
    /// Name of the matched service bucket in the profile
    pub matched_service: String,
    pub service_total: Decimal,
    pub estimated_saving: Decimal,
    /// True when the raw estimate exceeded the service total and was cut down
    pub capped: bool,
}

/// Baseline vs. optimized state after applying a set of actions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub baseline_total: Decimal,
    pub total_savings: Decimal,
    pub optimized_total: Decimal,
    pub delta: Decimal,
    /// `delta / baseline * 100` (2dp); zero when the baseline is zero
    pub percent_improvement: Decimal,
    /// True when summed savings exceeded the baseline and were clamped
    pub clamped: bool,
    pub estimates: Vec<SavingsEstimate>,
}

/// Monthly and annual projection of a flat percentage reduction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsProjection {
    pub baseline_monthly_cost: Decimal,
    pub reduction_fraction: Decimal,
    pub monthly_savings: Decimal,
    pub projected_annual_savings: Decimal,
}

/// One alternative plan measured against a baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDelta {
    pub cost: Decimal,
    pub delta: Decimal,
    pub savings_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoScenarioComparison {
    pub baseline_cost: Decimal,
    pub scenario_a: ScenarioDelta,
    pub scenario_b: ScenarioDelta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_action_deserialize_percent() {
        let action: OptimizationAction = serde_json::from_str(
            r#"{"name": "rightsize", "target_service": "compute", "percent_reduction": 0.2}"#,
        )
        .unwrap();
        assert_eq!(action.name, "rightsize");
        assert_eq!(action.target_service, "compute");
        assert_eq!(action.lever, SavingsLever::PercentReduction(dec!(0.2)));
    }

    #[test]
    fn test_action_deserialize_service_alias_and_default_name() {
        let action: OptimizationAction =
            serde_json::from_str(r#"{"service": "storage", "absolute_saving": 15}"#).unwrap();
        assert_eq!(action.target_service, "storage");
        assert_eq!(action.name, "storage");
        assert_eq!(action.lever, SavingsLever::AbsoluteSaving(dec!(15)));
    }

    #[test]
    fn test_action_deserialize_requires_exactly_one_lever() {
        let none = serde_json::from_str::<OptimizationAction>(
            r#"{"name": "x", "target_service": "compute"}"#,
        );
        assert!(none.is_err());

        let both = serde_json::from_str::<OptimizationAction>(
            r#"{"name": "x", "target_service": "compute", "percent_reduction": 0.1, "absolute_saving": 5}"#,
        );
        assert!(both.unwrap_err().to_string().contains("both"));
    }

    #[test]
    fn test_action_serialize_flat() {
        let action = OptimizationAction::absolute("delete snapshots", "storage", dec!(12.5));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["target_service"], "storage");
        assert_eq!(json["absolute_saving"], 12.5);
        assert!(json.get("percent_reduction").is_none());
    }
}
