//! Typed value comparison.
//!
//! Filter values extracted from a query are plain strings while record
//! values may be text or numbers. [`values_match`] compares them without
//! relying on implicit coercion:
//!
//! 1. Exact string equality after lowercasing both sides.
//! 2. Otherwise, if both sides parse as numbers, numeric equality.
//!
//! A side that does not parse as a number simply fails step 2; nothing
//! here can error.

use crate::models::AttributeValue;

/// Compare two raw strings: case-insensitive equality, then numeric equality.
pub fn values_match(left: &str, right: &str) -> bool {
    let l = left.trim();
    let r = right.trim();
    if l.to_lowercase() == r.to_lowercase() {
        return true;
    }
    match (parse_number(l), parse_number(r)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => false,
    }
}

/// Compare a record attribute value against a filter string.
pub fn attribute_matches(value: &AttributeValue, filter: &str) -> bool {
    match value {
        AttributeValue::Number(n) => match parse_number(filter) {
            Some(f) => (n - f).abs() < f64::EPSILON,
            None => values_match(&value.to_string(), filter),
        },
        AttributeValue::Text(s) => values_match(s, filter),
    }
}

/// Parse a finite number, ignoring surrounding whitespace.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_text() {
        assert!(values_match("Green", "green"));
        assert!(!values_match("Green", "greenish"));
    }

    #[test]
    fn test_numeric_equality() {
        assert!(values_match("42", "42.0"));
        assert!(values_match("042", "42"));
        assert!(!values_match("42", "43"));
    }

    #[test]
    fn test_non_numeric_falls_back_to_string() {
        assert!(!values_match("750ml", "750"));
        assert!(values_match("13%", "13%"));
        assert!(!values_match("inf", "infinity"));
    }

    #[test]
    fn test_attribute_number_against_filter() {
        assert!(attribute_matches(&AttributeValue::Number(2021.0), "2021"));
        assert!(!attribute_matches(&AttributeValue::Number(2021.0), "nv"));
        assert!(attribute_matches(&AttributeValue::Text("XL".into()), "xl"));
    }
}
