//! Grammar lookup across namespaces

use indexmap::IndexMap;

use super::store::Grammar;

/// Maps a namespace URI to the grammar that owns its declarations
pub trait GrammarResolver {
    /// Grammar for `namespace` ("" for no namespace)
    fn grammar(&self, namespace: &str) -> Option<&Grammar>;
}

/// Default [`GrammarResolver`] keyed by namespace URI string
#[derive(Debug, Default)]
pub struct GrammarPool {
    grammars: IndexMap<String, Grammar>,
}

impl GrammarPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grammar, returning the one it replaces
    pub fn insert(&mut self, namespace: impl Into<String>, grammar: Grammar) -> Option<Grammar> {
        self.grammars.insert(namespace.into(), grammar)
    }

    /// Mutable access for ingestion
    pub fn grammar_mut(&mut self, namespace: &str) -> Option<&mut Grammar> {
        self.grammars.get_mut(namespace)
    }

    /// Grammar for `namespace`, creating an empty one on first use
    pub fn entry(&mut self, namespace: &str, create: impl FnOnce() -> Grammar) -> &mut Grammar {
        self.grammars.entry(namespace.to_string()).or_insert_with(create)
    }

    /// Registered namespaces in insertion order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }

    /// Number of registered grammars
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

impl GrammarResolver for GrammarPool {
    fn grammar(&self, namespace: &str) -> Option<&Grammar> {
        self.grammars.get(namespace)
    }
}
