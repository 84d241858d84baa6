//! Write-side validation
//!
//! Checks run before anything touches the store. Each returns the cleaned
//! value so callers never persist untrimmed input.

use regex::Regex;

use crate::error::{EVError, Result};
use crate::vocabulary::{ConditionType, Operator};

/// Host names with at least one dot and an alphabetic TLD, or `localhost`
pub const DOMAIN_PATTERN: &str =
    r"^(?:(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}|localhost)$";

/// A required, non-blank text field
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EVError::invalid(message)),
    }
}

/// Validate a domain and return it trimmed
pub fn domain(value: &str) -> Result<String> {
    let value = value.trim();
    let pattern = Regex::new(DOMAIN_PATTERN).map_err(|e| EVError::InternalError {
        reason: format!("domain pattern failed to compile: {}", e),
    })?;
    if pattern.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(EVError::InvalidDomain {
            domain: value.to_string(),
        })
    }
}

pub fn condition_type(value: &str) -> Result<ConditionType> {
    ConditionType::parse(value).ok_or_else(|| EVError::InvalidConditionType {
        value: value.to_string(),
        allowed: ConditionType::allowed_list(),
    })
}

pub fn operator(value: &str) -> Result<Operator> {
    Operator::parse(value).ok_or_else(|| EVError::InvalidOperator {
        value: value.to_string(),
        allowed: Operator::allowed_list(),
    })
}

/// Type, operator and value of a condition.
///
/// The value may be empty (`equals ""` is a legitimate predicate) but must
/// be present.
pub fn condition_fields<'a>(
    condition_type: Option<&'a str>,
    op: Option<&'a str>,
    value: Option<&'a str>,
) -> Result<(ConditionType, Operator, &'a str)> {
    let (Some(t), Some(o), Some(v)) = (condition_type, op, value) else {
        return Err(EVError::invalid(
            "conditionType, operator, and value are required",
        ));
    };
    Ok((self::condition_type(t)?, operator(o)?, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_accepts_hosts() {
        for ok in ["example.com", "shop.example.co.uk", "my-site.io", "localhost", " a.bc "] {
            assert!(domain(ok).is_ok(), "{ok} should be accepted");
        }
        assert_eq!(domain(" a.bc ").unwrap(), "a.bc");
    }

    #[test]
    fn test_domain_rejects_garbage() {
        for bad in ["", "example", "-bad.com", "bad-.com", "exa mple.com", "http://x.com", "x.c1"] {
            assert!(
                matches!(domain(bad), Err(EVError::InvalidDomain { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  #hero "), "Selector is required").unwrap(), "#hero");
        let err = required(Some("   "), "Selector is required").unwrap_err();
        assert_eq!(err.to_string(), "Selector is required");
        assert!(required(None, "x").is_err());
    }

    #[test]
    fn test_condition_vocabulary_errors_list_allowed_values() {
        let err = condition_type("weather").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONDITION_TYPE");
        assert!(err.to_string().contains("screenSize"));

        let err = operator("between").unwrap_err();
        assert!(err.to_string().contains("not_exists"));
    }

    #[test]
    fn test_condition_fields_require_all_three() {
        assert!(condition_fields(Some("device"), Some("equals"), None).is_err());
        let (t, o, v) = condition_fields(Some("device"), Some("equals"), Some("")).unwrap();
        assert_eq!(t, ConditionType::Device);
        assert_eq!(o, Operator::Equals);
        assert_eq!(v, "");
    }
}
