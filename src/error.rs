//! Error types for xmlschema-grammar
//!
//! This module defines all error types used throughout the library.
//! Invalid content is reported as data (see `validators::models::ValidResult`);
//! the types here cover contract violations, datatype failures, ingestion
//! problems and internal faults.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of declaration a store handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Element declaration
    Element,
    /// Attribute declaration
    Attribute,
    /// Content-spec node
    ContentSpec,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Element => write!(f, "element declaration"),
            HandleKind::Attribute => write!(f, "attribute declaration"),
            HandleKind::ContentSpec => write!(f, "content-spec node"),
        }
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// A handle that was never issued by the store (caller bug)
    #[error("{kind} handle {index} is out of range")]
    OutOfRange {
        /// What the handle was supposed to address
        kind: HandleKind,
        /// The offending raw handle value
        index: i64,
    },

    /// A scope value that is neither top-level (-1) nor a local scope (>= 0)
    #[error("invalid scope value {0}")]
    InvalidScope(i64),

    /// A second element declaration for a (name, scope) pair already taken
    #[error("element handle {handle} duplicates the declaration at handle {existing}")]
    DuplicateDecl {
        /// Handle already registered for the name and scope
        existing: i64,
        /// Handle the duplicate was written to
        handle: i64,
    },

    /// An insertion offset past the end of the child list
    #[error("insertion offset {offset} is past the end of {len} children")]
    InvalidOffset {
        /// Requested offset
        offset: usize,
        /// Number of children
        len: usize,
    },

    /// A datatype validator rejected a value
    #[error("datatype error: {0}")]
    Datatype(#[from] DatatypeError),

    /// Content or attribute validation error
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Schema ingestion error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Unexpected internal failure; never a validation success
    #[error("internal validation failure: {0}")]
    Internal(String),

    /// Name error (invalid XML name or malformed full name)
    #[error("name error: {0}")]
    Name(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl Error {
    /// Shorthand for an out-of-range handle error
    pub fn out_of_range(kind: HandleKind, index: impl TryInto<i64>) -> Self {
        Error::OutOfRange {
            kind,
            index: index.try_into().unwrap_or(i64::MAX),
        }
    }

    /// Whether this error is a datatype-invalid signal
    pub fn is_datatype(&self) -> bool {
        matches!(self, Error::Datatype(_))
    }

    /// Whether this error is an internal failure
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

/// Datatype-invalid signal raised by a primitive datatype validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeError {
    /// Human-readable reason
    pub reason: String,
    /// Name of the datatype that rejected the value
    pub datatype: Option<String>,
    /// The rejected value
    pub value: Option<String>,
}

impl DatatypeError {
    /// Create a new datatype error
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            datatype: None,
            value: None,
        }
    }

    /// Set the datatype name
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Set the rejected value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for DatatypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(ref datatype) = self.datatype {
            write!(f, " (type '{}')", datatype)?;
        }
        if let Some(ref value) = self.value {
            write!(f, ": '{}'", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatatypeError {}

/// Validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Path to the element that failed validation
    pub path: Option<String>,
    /// Original reason
    pub reason: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            reason: None,
        }
    }

    /// Set the path where validation failed
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Schema ingestion error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Component that caused the error
    pub component: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            component: None,
        }
    }

    /// Set the offending component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref component) = self.component {
            write!(f, "\n\nComponent: {}", component)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("Attribute 'id' is required")
            .with_reason("no value supplied")
            .with_path("/order/item");

        let msg = format!("{}", err);
        assert!(msg.contains("Attribute 'id' is required"));
        assert!(msg.contains("Reason:"));
        assert!(msg.contains("Path:"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("unknown type 'tns:missing'").with_component("element 'order'");

        let msg = format!("{}", err);
        assert!(msg.contains("unknown type"));
        assert!(msg.contains("Component:"));
    }

    #[test]
    fn test_datatype_error_display() {
        let err = DatatypeError::new("not a boolean")
            .with_datatype("boolean")
            .with_value("maybe");
        assert_eq!(err.to_string(), "not a boolean (type 'boolean'): 'maybe'");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = Error::out_of_range(HandleKind::Element, 42usize);
        assert_eq!(err.to_string(), "element declaration handle 42 is out of range");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = DatatypeError::new("bad").into();
        assert!(err.is_datatype());
        assert!(!err.is_internal());
    }
}
