//! Primitive datatype validators
//!
//! Simple-content elements and typed attributes delegate value checking to a
//! [`DatatypeValidator`]. A validator either accepts the value, raises the
//! datatype-invalid signal ([`DatatypeFailure::Invalid`]), or fails for some
//! other reason ([`DatatypeFailure::Internal`]), which callers must never
//! treat as acceptance.
//!
//! See: https://www.w3.org/TR/xmlschema-2/

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{DatatypeError, Error, ParseError, Result};
use crate::names::is_valid_ncname;

/// Outcome of a failed datatype check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatatypeFailure {
    /// The value is not in the lexical or value space of the type
    Invalid(DatatypeError),
    /// The validator itself failed
    Internal(String),
}

impl From<DatatypeError> for DatatypeFailure {
    fn from(err: DatatypeError) -> Self {
        DatatypeFailure::Invalid(err)
    }
}

impl From<DatatypeFailure> for Error {
    fn from(failure: DatatypeFailure) -> Self {
        match failure {
            DatatypeFailure::Invalid(err) => Error::Datatype(err),
            DatatypeFailure::Internal(msg) => Error::Internal(msg),
        }
    }
}

/// Validator for the character data of one primitive type
pub trait DatatypeValidator: fmt::Debug + Send + Sync {
    /// Type name used in messages
    fn name(&self) -> &str;

    /// Check a value
    fn validate(&self, value: &str) -> std::result::Result<(), DatatypeFailure>;
}

/// White space handling applied before the lexical check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Keep the value as is
    Preserve,
    /// Replace tab, newline and carriage return with spaces
    Replace,
    /// Replace, then collapse runs of spaces and trim
    Collapse,
}

impl WhiteSpace {
    /// Normalize a value
    pub fn normalize(&self, value: &str) -> String {
        match self {
            WhiteSpace::Preserve => value.to_string(),
            WhiteSpace::Replace => value.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

type LexicalCheck = fn(&str) -> std::result::Result<(), String>;

/// Built-in XSD datatype
#[derive(Debug, Clone)]
pub struct BuiltinDatatype {
    name: &'static str,
    white_space: WhiteSpace,
    check: LexicalCheck,
}

impl DatatypeValidator for BuiltinDatatype {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, value: &str) -> std::result::Result<(), DatatypeFailure> {
        let normalized = self.white_space.normalize(value);
        (self.check)(&normalized).map_err(|reason| {
            DatatypeFailure::Invalid(
                DatatypeError::new(reason)
                    .with_datatype(self.name)
                    .with_value(value),
            )
        })
    }
}

// =============================================================================
// Lexical checks
// =============================================================================

fn check_string(_value: &str) -> std::result::Result<(), String> {
    Ok(())
}

fn check_normalized_string(value: &str) -> std::result::Result<(), String> {
    if value.contains(['\r', '\n', '\t']) {
        return Err("normalizedString cannot contain CR, LF, or TAB characters".to_string());
    }
    Ok(())
}

fn check_token(value: &str) -> std::result::Result<(), String> {
    check_normalized_string(value)?;
    if value.starts_with(' ') || value.ends_with(' ') || value.contains("  ") {
        return Err("token cannot have leading/trailing spaces or consecutive spaces".to_string());
    }
    Ok(())
}

fn check_boolean(value: &str) -> std::result::Result<(), String> {
    match value {
        "true" | "false" | "1" | "0" => Ok(()),
        _ => Err("not a valid boolean".to_string()),
    }
}

fn check_decimal(value: &str) -> std::result::Result<(), String> {
    static DECIMAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("decimal pattern is valid"));
    if !DECIMAL.is_match(value) {
        return Err("not a valid decimal".to_string());
    }
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value.strip_prefix('+').unwrap_or(value)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let canonical = if frac_part.is_empty() {
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    };
    Decimal::from_str(&canonical)
        .map(|_| ())
        .map_err(|e| format!("decimal out of range: {}", e))
}

fn integer_value(value: &str) -> std::result::Result<i128, String> {
    static INTEGER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("integer pattern is valid"));
    if !INTEGER.is_match(value) {
        return Err("not a valid integer".to_string());
    }
    value
        .parse::<i128>()
        .map_err(|_| "integer out of supported range".to_string())
}

fn check_integer(value: &str) -> std::result::Result<(), String> {
    integer_value(value).map(|_| ())
}

fn check_bounded(value: &str, min: i128, max: i128) -> std::result::Result<(), String> {
    let n = integer_value(value)?;
    if n < min || n > max {
        return Err(format!("value must be between {} and {}", min, max));
    }
    Ok(())
}

fn check_int(value: &str) -> std::result::Result<(), String> {
    check_bounded(value, i128::from(i32::MIN), i128::from(i32::MAX))
}

fn check_long(value: &str) -> std::result::Result<(), String> {
    check_bounded(value, i128::from(i64::MIN), i128::from(i64::MAX))
}

fn check_non_negative_integer(value: &str) -> std::result::Result<(), String> {
    if integer_value(value)? < 0 {
        return Err("value must be non-negative".to_string());
    }
    Ok(())
}

fn check_positive_integer(value: &str) -> std::result::Result<(), String> {
    if integer_value(value)? < 1 {
        return Err("value must be positive".to_string());
    }
    Ok(())
}

fn check_date(value: &str) -> std::result::Result<(), String> {
    // optional timezone suffix: Z or +hh:mm / -hh:mm
    static TZ: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(Z|[+-]\d{2}:\d{2})$").expect("timezone pattern is valid"));
    let date = TZ.replace(value, "");
    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|e| format!("not a valid date: {}", e))
}

fn check_date_time(value: &str) -> std::result::Result<(), String> {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|_| ())
        .map_err(|e| format!("not a valid dateTime: {}", e))
}

fn check_ncname(value: &str) -> std::result::Result<(), String> {
    if is_valid_ncname(value) {
        Ok(())
    } else {
        Err("not a valid NCName".to_string())
    }
}

fn check_any_uri(value: &str) -> std::result::Result<(), String> {
    if value.chars().any(|c| c == ' ' || c.is_control()) {
        return Err("anyURI cannot contain spaces or control characters".to_string());
    }
    Ok(())
}

const BUILTINS: &[(&str, WhiteSpace, LexicalCheck)] = &[
    ("string", WhiteSpace::Preserve, check_string),
    ("normalizedString", WhiteSpace::Replace, check_normalized_string),
    ("token", WhiteSpace::Collapse, check_token),
    ("boolean", WhiteSpace::Collapse, check_boolean),
    ("decimal", WhiteSpace::Collapse, check_decimal),
    ("integer", WhiteSpace::Collapse, check_integer),
    ("int", WhiteSpace::Collapse, check_int),
    ("long", WhiteSpace::Collapse, check_long),
    ("nonNegativeInteger", WhiteSpace::Collapse, check_non_negative_integer),
    ("positiveInteger", WhiteSpace::Collapse, check_positive_integer),
    ("date", WhiteSpace::Collapse, check_date),
    ("dateTime", WhiteSpace::Collapse, check_date_time),
    ("NCName", WhiteSpace::Collapse, check_ncname),
    ("anyURI", WhiteSpace::Collapse, check_any_uri),
];

/// Look up a built-in datatype by its local name
pub fn builtin(name: &str) -> Option<Arc<dyn DatatypeValidator>> {
    BUILTINS
        .iter()
        .find(|(builtin, _, _)| *builtin == name)
        .map(|&(name, white_space, check)| {
            Arc::new(BuiltinDatatype {
                name,
                white_space,
                check,
            }) as Arc<dyn DatatypeValidator>
        })
}

// =============================================================================
// Restrictions
// =============================================================================

/// A datatype derived by restriction with enumeration and pattern facets
#[derive(Debug, Clone)]
pub struct RestrictedDatatype {
    name: String,
    base: Arc<dyn DatatypeValidator>,
    enumeration: Vec<String>,
    patterns: Vec<(String, Regex)>,
}

impl RestrictedDatatype {
    /// Create a restriction of `base` with no facets
    pub fn new(name: impl Into<String>, base: Arc<dyn DatatypeValidator>) -> Self {
        Self {
            name: name.into(),
            base,
            enumeration: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Add an enumeration value
    pub fn with_enumeration(mut self, value: impl Into<String>) -> Self {
        self.enumeration.push(value.into());
        self
    }

    /// Add a pattern facet; patterns match the whole value
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| ParseError::new(format!("invalid pattern '{}': {}", pattern, e)))?;
        self.patterns.push((pattern.to_string(), regex));
        Ok(self)
    }
}

impl DatatypeValidator for RestrictedDatatype {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, value: &str) -> std::result::Result<(), DatatypeFailure> {
        self.base.validate(value)?;

        let invalid = |reason: String| {
            DatatypeFailure::Invalid(
                DatatypeError::new(reason)
                    .with_datatype(self.name.as_str())
                    .with_value(value),
            )
        };

        if !self.enumeration.is_empty() && !self.enumeration.iter().any(|v| v == value) {
            return Err(invalid(format!(
                "value must be one of: {}",
                self.enumeration.join(", ")
            )));
        }
        for (pattern, regex) in &self.patterns {
            if !regex.is_match(value) {
                return Err(invalid(format!("value does not match pattern '{}'", pattern)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, value: &str) -> bool {
        builtin(name).unwrap().validate(value).is_ok()
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("string").is_some());
        assert!(builtin("nonsense").is_none());
        assert_eq!(builtin("int").unwrap().name(), "int");
    }

    #[test]
    fn test_boolean() {
        assert!(check("boolean", "true"));
        assert!(check("boolean", " 0 "));
        assert!(!check("boolean", "yes"));
    }

    #[test]
    fn test_numbers() {
        assert!(check("decimal", "-12.50"));
        assert!(check("decimal", ".5"));
        assert!(!check("decimal", "1e3"));
        assert!(check("integer", "+42"));
        assert!(!check("integer", "4.2"));
        assert!(check("int", "2147483647"));
        assert!(!check("int", "2147483648"));
        assert!(!check("positiveInteger", "0"));
        assert!(check("nonNegativeInteger", "0"));
    }

    #[test]
    fn test_dates() {
        assert!(check("date", "2024-02-29"));
        assert!(check("date", "2024-02-29Z"));
        assert!(!check("date", "2023-02-29"));
        assert!(check("dateTime", "2024-01-01T10:00:00Z"));
        assert!(check("dateTime", "2024-01-01T10:00:00"));
        assert!(!check("dateTime", "2024-01-01"));
    }

    #[test]
    fn test_invalid_carries_reason() {
        let err = builtin("boolean").unwrap().validate("maybe").unwrap_err();
        match err {
            DatatypeFailure::Invalid(e) => {
                assert_eq!(e.datatype.as_deref(), Some("boolean"));
                assert_eq!(e.value.as_deref(), Some("maybe"));
            }
            other => panic!("expected invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_restriction_facets() {
        let size = RestrictedDatatype::new("size", builtin("token").unwrap())
            .with_enumeration("S")
            .with_enumeration("M")
            .with_enumeration("L");
        assert!(size.validate("M").is_ok());
        assert!(size.validate("XL").is_err());

        let sku = RestrictedDatatype::new("sku", builtin("string").unwrap())
            .with_pattern(r"[A-Z]{3}-\d{4}")
            .unwrap();
        assert!(sku.validate("ABC-1234").is_ok());
        assert!(sku.validate("xABC-1234").is_err());
    }

    #[test]
    fn test_failure_conversion() {
        let err: Error = DatatypeFailure::Internal("boom".to_string()).into();
        assert!(err.is_internal());
        let err: Error = DatatypeFailure::Invalid(DatatypeError::new("bad")).into();
        assert!(err.is_datatype());
    }
}
