//! Condition evaluation - compares an extracted value against a condition

use regex::RegexBuilder;

use crate::vocabulary::Operator;

/// Upper bound on the compiled size of a tenant-supplied pattern
pub const MAX_PATTERN_SIZE: usize = 1 << 20;

/// Evaluate a stored condition operator.
///
/// Unknown operator names never match.
pub fn matches(actual: &str, operator: &str, expected: &str) -> bool {
    match Operator::parse(operator) {
        Some(op) => evaluate(actual, op, expected),
        None => false,
    }
}

/// Evaluate a known operator.
///
/// Comparisons are case-insensitive, except `regex`, which runs the pattern
/// as written against the value as extracted. A pattern that fails to compile
/// is logged and never matches.
pub fn evaluate(actual: &str, operator: Operator, expected: &str) -> bool {
    if operator == Operator::Regex {
        return regex_matches(actual, expected);
    }

    let value = actual.to_lowercase();
    let condition = expected.to_lowercase();

    match operator {
        Operator::Equals => value == condition,
        Operator::NotEquals => value != condition,
        Operator::Contains => value.contains(&condition),
        Operator::NotContains => !value.contains(&condition),
        Operator::StartsWith => value.starts_with(&condition),
        Operator::EndsWith => value.ends_with(&condition),
        Operator::Regex
        | Operator::GreaterThan
        | Operator::LessThan
        | Operator::Exists
        | Operator::NotExists => false,
    }
}

fn regex_matches(actual: &str, pattern: &str) -> bool {
    match RegexBuilder::new(pattern).size_limit(MAX_PATTERN_SIZE).build() {
        Ok(re) => re.is_match(actual),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid condition pattern; treating as no match");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_case_insensitive() {
        assert!(matches("Chrome/91", "contains", "chrome"));
        assert!(!matches("Chrome/91", "not_contains", "CHROME"));
    }

    #[test]
    fn test_string_operators() {
        assert!(matches("Mobile", "equals", "mobile"));
        assert!(!matches("mobile", "equals", "tablet"));
        assert!(matches("mobile", "not_equals", "tablet"));
        assert!(matches("/Blog/post-1", "starts_with", "/blog"));
        assert!(matches("/blog/post-1", "ends_with", "POST-1"));
        assert!(!matches("/blog/post-1", "ends_with", "/blog"));
    }

    #[test]
    fn test_empty_values() {
        assert!(matches("", "equals", ""));
        assert!(matches("anything", "contains", ""));
        assert!(matches("", "not_contains", "x"));
    }

    #[test]
    fn test_regex_is_case_sensitive() {
        assert!(matches("/Products/42", "regex", r"^/Products/\d+$"));
        assert!(!matches("/products/42", "regex", r"^/Products/\d+$"));
        assert!(matches("/products/42", "regex", r"(?i)^/PRODUCTS/\d+$"));
    }

    #[test]
    fn test_regex_is_unanchored() {
        assert!(matches("https://example.com/sale/shoes", "regex", "sale"));
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        assert!(!matches("anything", "regex", "[invalid("));
        assert!(!matches("[invalid(", "regex", "[invalid("));
    }

    #[test]
    fn test_unimplemented_operators_never_match() {
        for op in Operator::ALL.iter().filter(|op| !op.is_evaluated()) {
            assert!(!evaluate("5", *op, "5"), "{} should not match", op);
            assert!(!evaluate("", *op, ""), "{} should not match", op);
        }
        assert!(!matches("a", "is", "a"));
        assert!(!matches("a", "", "a"));
    }
}
