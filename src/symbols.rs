//! Name interning
//!
//! Element, attribute and namespace names are interned once into a
//! [`SymbolTable`] and referred to by [`Symbol`] handles afterwards.
//! The grammar store and the content models only ever compare symbols.

use indexmap::IndexSet;
use serde::Serialize;

/// Handle of an interned string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Symbol(u32);

impl Symbol {
    /// Raw handle value
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Name table service used by the grammar and the resolvers
pub trait NameTable {
    /// Intern a string, returning its stable handle
    fn intern(&mut self, text: &str) -> Symbol;

    /// Resolve a handle back to its text
    fn resolve(&self, symbol: Symbol) -> Option<&str>;

    /// Find the handle of an already interned string without interning it
    fn lookup(&self, text: &str) -> Option<Symbol>;
}

/// Default [`NameTable`] backed by an insertion-ordered set
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    names: IndexSet<Box<str>>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameTable for SymbolTable {
    fn intern(&mut self, text: &str) -> Symbol {
        if let Some(index) = self.names.get_index_of(text) {
            return Symbol(index as u32);
        }
        let (index, _) = self.names.insert_full(text.into());
        Symbol(index as u32)
    }

    fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.names.get_index(symbol.index()).map(|s| &**s)
    }

    fn lookup(&self, text: &str) -> Option<Symbol> {
        self.names.get_index_of(text).map(|index| Symbol(index as u32))
    }
}
