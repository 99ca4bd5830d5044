//! Namespace-qualified names
//!
//! This module provides [`QualifiedName`], the interned (namespace, local
//! name) pair used as an element identity across grammars, plus the
//! conversions between it and its textual forms.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::names::FullName;
use crate::symbols::{NameTable, Symbol};

/// Qualified name - interned namespace URI plus local name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    /// Namespace URI (None for no namespace)
    pub uri: Option<Symbol>,
    /// Local name
    pub local: Symbol,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new(uri: Option<Symbol>, local: Symbol) -> Self {
        Self { uri, local }
    }

    /// Create a name without a namespace
    pub fn local(local: Symbol) -> Self {
        Self { uri: None, local }
    }

    /// Intern both parts of a name; an empty URI means no namespace
    pub fn intern(table: &mut dyn NameTable, uri: &str, local: &str) -> Self {
        let uri = if uri.is_empty() {
            None
        } else {
            Some(table.intern(uri))
        };
        Self {
            uri,
            local: table.intern(local),
        }
    }

    /// Find an already interned name, without interning anything
    pub fn lookup(table: &dyn NameTable, uri: &str, local: &str) -> Option<Self> {
        let uri = if uri.is_empty() {
            None
        } else {
            Some(table.lookup(uri)?)
        };
        Some(Self {
            uri,
            local: table.lookup(local)?,
        })
    }

    /// Namespace URI text ("" for no namespace)
    pub fn uri_str<'t>(&self, table: &'t dyn NameTable) -> Result<&'t str> {
        match self.uri {
            Some(uri) => table
                .resolve(uri)
                .ok_or_else(|| Error::Namespace(format!("unresolved namespace symbol {:?}", uri))),
            None => Ok(""),
        }
    }

    /// Local name text
    pub fn local_str<'t>(&self, table: &'t dyn NameTable) -> Result<&'t str> {
        table
            .resolve(self.local)
            .ok_or_else(|| Error::Name(format!("unresolved name symbol {:?}", self.local)))
    }

    /// The `"uri,localpart"` form used for substitution links
    pub fn to_full_name(&self, table: &dyn NameTable) -> Result<FullName> {
        Ok(FullName::new(self.uri_str(table)?, self.local_str(table)?))
    }

    /// Clark notation (`{uri}local`) for messages
    pub fn display(&self, table: &dyn NameTable) -> String {
        let local = table.resolve(self.local).unwrap_or("?");
        match self.uri.and_then(|uri| table.resolve(uri)) {
            Some(uri) => format!("{{{}}}{}", uri, local),
            None => local.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_qualified_name_intern() {
        let mut table = SymbolTable::new();
        let a = QualifiedName::intern(&mut table, "urn:a", "item");
        let b = QualifiedName::intern(&mut table, "", "item");
        assert_ne!(a, b);
        assert_eq!(b.uri, None);
        assert_eq!(a.local, b.local);
    }

    #[test]
    fn test_qualified_name_display() {
        let mut table = SymbolTable::new();
        let a = QualifiedName::intern(&mut table, "http://example.com", "element");
        assert_eq!(a.display(&table), "{http://example.com}element");
        let b = QualifiedName::intern(&mut table, "", "element");
        assert_eq!(b.display(&table), "element");
    }

    #[test]
    fn test_full_name_round_trip() {
        let mut table = SymbolTable::new();
        let a = QualifiedName::intern(&mut table, "urn:a", "head");
        let full = a.to_full_name(&table).unwrap();
        assert_eq!(full.as_str(), "urn:a,head");
        let (uri, local) = full.split().unwrap();
        assert_eq!(QualifiedName::lookup(&table, uri, local), Some(a));
    }

    #[test]
    fn test_lookup_unknown() {
        let table = SymbolTable::new();
        assert!(QualifiedName::lookup(&table, "", "nothing").is_none());
    }
}
