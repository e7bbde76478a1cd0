//! Column name normalization service
//!
//! Billing exports from different providers spell the same column in many
//! ways ("Service Name", "service_name", " SERVICE "). Headers are normalized
//! to a canonical form before column detection.

/// Normalize a CSV header to canonical form.
///
/// Transformations:
/// - Trim surrounding whitespace
/// - Lowercase
/// - Inner whitespace runs to a single underscore: "Unblended Cost" → "unblended_cost"
///
/// # Examples
/// ```
/// use optiscale::services::normalizer::normalize_column_name;
///
/// assert_eq!(normalize_column_name(" Unblended Cost "), "unblended_cost");
/// assert_eq!(normalize_column_name("Service"), "service");
/// ```
pub fn normalize_column_name(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Find a column by exact canonical name, then by the first header containing
/// any of `fragments`. Columns in `taken` are skipped.
pub fn find_column(
    headers: &[String],
    exact: &str,
    fragments: &[&str],
    taken: &[usize],
) -> Option<usize> {
    let free = |i: &usize| !taken.contains(i);

    (0..headers.len())
        .filter(free)
        .find(|&i| headers[i] == exact)
        .or_else(|| {
            (0..headers.len())
                .filter(free)
                .find(|&i| fragments.iter().any(|f| headers[i].contains(f)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| normalize_column_name(s)).collect()
    }

    // ========== normalize_column_name ==========

    #[test]
    fn test_normalize_spaces_to_underscore() {
        assert_eq!(normalize_column_name("Cost Center  Code"), "cost_center_code");
    }

    #[test]
    fn test_normalize_already_canonical() {
        assert_eq!(normalize_column_name("amount"), "amount");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_column_name("   "), "");
    }

    // ========== find_column ==========

    #[test]
    fn test_find_column_prefers_exact() {
        let h = headers(&["Line Cost", "amount"]);
        assert_eq!(find_column(&h, "amount", &["cost"], &[]), Some(1));
    }

    #[test]
    fn test_find_column_fragment_fallback() {
        let h = headers(&["Product Name", "Unblended Cost"]);
        assert_eq!(find_column(&h, "amount", &["cost"], &[]), Some(1));
        assert_eq!(
            find_column(&h, "service", &["service", "product"], &[]),
            Some(0)
        );
    }

    #[test]
    fn test_find_column_skips_taken() {
        let h = headers(&["project_cost", "project"]);
        assert_eq!(find_column(&h, "amount", &["cost"], &[]), Some(0));
        assert_eq!(
            find_column(&h, "account", &["account", "project"], &[0]),
            Some(1)
        );
    }

    #[test]
    fn test_find_column_missing() {
        let h = headers(&["region", "usage"]);
        assert_eq!(find_column(&h, "amount", &["cost"], &[]), None);
    }
}
