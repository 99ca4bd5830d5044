//! XML name validation and the substitution-link name codec
//!
//! This module provides NCName/QName checks used while ingesting schema
//! documents, and [`FullName`], the `"uri,localpart"` serialization of a
//! head-element name recorded on substitution and equivalence links.

use std::fmt;

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\-\.0-9\u{B7}]*$",
    )
    .expect("NCName pattern is valid")
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Validate an NCName and return an error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid NCName: '{}'", name)))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Serialized head-element name: `"uri,localpart"`, or `",localpart"`
/// when the element has no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullName(String);

impl FullName {
    /// Build the serialized form from its parts
    pub fn new(uri: &str, local: &str) -> Self {
        Self(format!("{},{}", uri, local))
    }

    /// Wrap an already serialized string, checking its shape
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let full = Self(text.into());
        full.split()?;
        Ok(full)
    }

    /// Split into (uri, local part); local parts never contain a comma, so
    /// the split happens at the last one
    pub fn split(&self) -> Result<(&str, &str)> {
        match self.0.rsplit_once(',') {
            Some((_, "")) | None => Err(Error::Name(format!(
                "malformed full name '{}', expected 'uri,localpart'",
                self.0
            ))),
            Some(parts) => Ok(parts),
        }
    }

    /// The serialized text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
