//! Category exemption for debt generation.

/// Category names that never accumulate carried-forward debt. These represent
/// recurring discretionary spend, not billable obligations.
const EXEMPT_CATEGORY_NAMES: [&str; 8] = [
    "food and dining",
    "food & dining",
    "food",
    "dining",
    "transport",
    "travel",
    "transport / travel",
    "transport/travel",
];

/// Returns true when an expense in this category must never spawn a debt.
///
/// Matching is against the trimmed, lowercased name: exact membership in the
/// exemption set, or containing both "food" and "dining", or containing
/// "transport" or "travel" anywhere. The substring rule over-exempts (a
/// "Travel Insurance" category is exempt too); that behavior is kept.
///
/// A missing or empty name is not evidence of exemption and returns false.
pub fn is_non_debt_category_name(name: Option<&str>) -> bool {
    let Some(raw) = name else {
        return false;
    };
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    if EXEMPT_CATEGORY_NAMES.contains(&normalized.as_str()) {
        return true;
    }
    (normalized.contains("food") && normalized.contains("dining"))
        || normalized.contains("transport")
        || normalized.contains("travel")
}
