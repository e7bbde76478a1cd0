//! Currency rounding and formatting
//!
//! Arithmetic on [`Decimal`] is exact. Rounding to cents happens only when a
//! value is presented, using banker's rounding, so grouped subtotals always
//! sum to the overall total. Presented values are within ±0.01 of the exact
//! figure.

use crate::types::{OptiscaleError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown for money and percentages
pub const DISPLAY_DP: u32 = 2;

/// Round to cents (half-to-even)
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(DISPLAY_DP);
    rounded
}

/// `part / whole * 100`, rounded to 2dp. Zero when `whole` is zero.
///
/// Fails when the ratio does not fit in a `Decimal` (a huge part over a tiny
/// whole).
pub fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole.is_zero() {
        return Ok(round_money(Decimal::ZERO));
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or_else(|| {
            OptiscaleError::InvalidArgument(format!(
                "percentage of {} over {} is out of range",
                part, whole
            ))
        })
}

/// Sum without overflow; `None` when the total does not fit in a `Decimal`
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Format with thousand separators and two decimals (e.g., 1234567.891 -> "1,234,567.89")
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_money(value);
    let s = rounded.abs().to_string();
    let (int_part, frac_part) = s.split_once('.').unwrap_or((&s, "00"));

    let len = int_part.len();
    let mut result = String::with_capacity(s.len() + len / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        result.push('-');
    }

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in int_part.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }
    result.push('.');
    result.push_str(frac_part);
    result
}

/// Amount prefixed with its currency code (e.g., "USD 1,250.00")
pub fn format_money(value: Decimal, currency: &str) -> String {
    format!("{} {}", currency, format_amount(value))
}

/// Percentage bar with filled/empty blocks
/// Example: 50% with width 10 → "█████░░░░░"
pub fn format_share_bar(percent: Decimal, width: usize) -> String {
    let clamped = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let filled = (clamped * Decimal::from(width) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_even() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.34));
        assert_eq!(round_money(dec!(2.355)), dec!(2.36));
        assert_eq!(round_money(dec!(175)).to_string(), "175.00");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(25), dec!(175)).unwrap(), dec!(14.29));
        assert_eq!(percent_of(dec!(50), dec!(50)).unwrap(), dec!(100));
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert!(percent_of(dec!(10), Decimal::ZERO).unwrap().is_zero());
    }

    #[test]
    fn test_percent_of_out_of_range() {
        let err = percent_of(dec!(70000000000000000000000000000), dec!(0.0001)).unwrap_err();
        assert!(matches!(err, OptiscaleError::InvalidArgument(_)));
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([dec!(1.5), dec!(2.25)]), Some(dec!(3.75)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(checked_sum(Vec::new()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_format_amount_separators() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(999.999)), "1,000.00");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(-1500)), "-1,500.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(175), "USD"), "USD 175.00");
    }

    #[test]
    fn test_format_share_bar() {
        assert_eq!(format_share_bar(dec!(50), 10), "█████░░░░░");
        assert_eq!(format_share_bar(dec!(0), 4), "░░░░");
        assert_eq!(format_share_bar(dec!(250), 4), "████");
    }
}
