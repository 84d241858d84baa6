//! Condition vocabulary shared by the write side and the resolver
//!
//! The catalog validates stored conditions against these enumerations and the
//! resolver dispatches on the very same types, so the two cannot drift apart
//! unnoticed. Not every accepted value is implemented by resolution: see
//! [`ConditionType::is_extracted`] and [`Operator::is_evaluated`]. Conditions
//! using an unimplemented value are valid configuration that never matches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Request dimension a condition inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "referrer")]
    Referrer,
    #[serde(rename = "device")]
    Device,
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "os")]
    Os,
    #[serde(rename = "screenSize")]
    ScreenSize,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "cookies")]
    Cookies,
    #[serde(rename = "queryParam")]
    QueryParam,
    #[serde(rename = "userRole")]
    UserRole,
    #[serde(rename = "loginStatus")]
    LoginStatus,
    #[serde(rename = "language")]
    Language,
    #[serde(rename = "geolocation")]
    Geolocation,
    #[serde(rename = "custom")]
    Custom,
}

impl ConditionType {
    /// Every accepted condition type, in the order the dashboard lists them
    pub const ALL: [ConditionType; 17] = [
        ConditionType::Url,
        ConditionType::Path,
        ConditionType::Referrer,
        ConditionType::Device,
        ConditionType::Browser,
        ConditionType::Os,
        ConditionType::ScreenSize,
        ConditionType::Time,
        ConditionType::Day,
        ConditionType::Date,
        ConditionType::Cookies,
        ConditionType::QueryParam,
        ConditionType::UserRole,
        ConditionType::LoginStatus,
        ConditionType::Language,
        ConditionType::Geolocation,
        ConditionType::Custom,
    ];

    /// Wire name of the condition type
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Url => "url",
            ConditionType::Path => "path",
            ConditionType::Referrer => "referrer",
            ConditionType::Device => "device",
            ConditionType::Browser => "browser",
            ConditionType::Os => "os",
            ConditionType::ScreenSize => "screenSize",
            ConditionType::Time => "time",
            ConditionType::Day => "day",
            ConditionType::Date => "date",
            ConditionType::Cookies => "cookies",
            ConditionType::QueryParam => "queryParam",
            ConditionType::UserRole => "userRole",
            ConditionType::LoginStatus => "loginStatus",
            ConditionType::Language => "language",
            ConditionType::Geolocation => "geolocation",
            ConditionType::Custom => "custom",
        }
    }

    /// Look up a condition type by its exact wire name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Whether the context extractor produces a value for this type.
    ///
    /// Everything else extracts to the empty string.
    pub fn is_extracted(&self) -> bool {
        matches!(
            self,
            ConditionType::Url
                | ConditionType::Path
                | ConditionType::Referrer
                | ConditionType::Device
                | ConditionType::Language
        )
    }

    /// Comma-separated list of all wire names
    pub fn allowed_list() -> String {
        join(Self::ALL.iter().map(|t| t.as_str()))
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown condition type '{}'", s))
    }
}

/// Comparison applied between the extracted value and the condition value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Regex,
    GreaterThan,
    LessThan,
    Exists,
    NotExists,
}

impl Operator {
    /// Every accepted operator
    pub const ALL: [Operator; 11] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Regex,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Exists,
        Operator::NotExists,
    ];

    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Regex => "regex",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
        }
    }

    /// Look up an operator by its exact wire name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == value)
    }

    /// Whether the condition evaluator implements this operator.
    ///
    /// The others always evaluate to `false`.
    pub fn is_evaluated(&self) -> bool {
        !matches!(
            self,
            Operator::GreaterThan | Operator::LessThan | Operator::Exists | Operator::NotExists
        )
    }

    /// Comma-separated list of all wire names
    pub fn allowed_list() -> String {
        join(Self::ALL.iter().map(|op| op.as_str()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_type_names_round_trip() {
        for t in ConditionType::ALL {
            assert_eq!(ConditionType::parse(t.as_str()), Some(t));
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_operator_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(ConditionType::parse("screenSize"), Some(ConditionType::ScreenSize));
        assert_eq!(ConditionType::parse("screensize"), None);
        assert_eq!(ConditionType::parse("device_type"), None);
        assert_eq!(Operator::parse("EQUALS"), None);
    }

    #[test]
    fn test_implemented_subsets() {
        let extracted: Vec<_> = ConditionType::ALL
            .iter()
            .filter(|t| t.is_extracted())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(extracted, vec!["url", "path", "referrer", "device", "language"]);

        let unevaluated: Vec<_> = Operator::ALL
            .iter()
            .filter(|op| !op.is_evaluated())
            .map(|op| op.as_str())
            .collect();
        assert_eq!(
            unevaluated,
            vec!["greater_than", "less_than", "exists", "not_exists"]
        );
    }

    #[test]
    fn test_allowed_list() {
        assert!(Operator::allowed_list().starts_with("equals, not_equals"));
        assert!(ConditionType::allowed_list().ends_with("geolocation, custom"));
    }
}
