//! Substitution group and equivalence class resolution
//!
//! An element may stand in for a head element when a chain of head links
//! (`substitutionGroup`, or the legacy `equivClass`) leads from it to the
//! head. The chain may cross namespaces; each hop looks the current element
//! up in the grammar owning its namespace.
//!
//! The walk is bounded by [`Limits::max_substitution_depth`]: link cycles
//! and over-long chains resolve to "not substitutable".
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cos-equiv-derived-ok-rec

use tracing::debug;

use crate::grammar::{ElementDecl, GrammarKind, GrammarResolver, LinkKind, Scope};
use crate::limits::Limits;
use crate::namespaces::QualifiedName;
use crate::symbols::NameTable;

use super::models::NameMatcher;

/// Answers "can `candidate` stand in for `head`" across grammars
pub struct SubstitutionResolver<'a> {
    grammars: &'a dyn GrammarResolver,
    names: &'a dyn NameTable,
    link: LinkKind,
    max_depth: usize,
}

impl<'a> SubstitutionResolver<'a> {
    /// Resolver following substitution-group links with default limits
    pub fn new(grammars: &'a dyn GrammarResolver, names: &'a dyn NameTable) -> Self {
        Self {
            grammars,
            names,
            link: LinkKind::SubstitutionGroup,
            max_depth: Limits::default().max_substitution_depth,
        }
    }

    /// Follow a different link kind
    pub fn with_link(mut self, link: LinkKind) -> Self {
        self.link = link;
        self
    }

    /// Take the hop cap from `limits`
    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.max_depth = limits.max_substitution_depth;
        self
    }

    /// Link kind being followed
    pub fn link(&self) -> LinkKind {
        self.link
    }

    /// Top-level declaration of an element given as text, if its grammar
    /// is a schema grammar and declares it
    fn top_level_decl(&self, uri: &str, local: &str) -> Option<&'a ElementDecl> {
        let grammar = self.grammars.grammar(uri)?;
        if grammar.kind() != GrammarKind::Schema {
            debug!(namespace = uri, "grammar is not a schema grammar");
            return None;
        }
        let name = QualifiedName::lookup(self.names, uri, local)?;
        let handle = grammar.element_decl_index(&name, Scope::TopLevel)?;
        grammar.element_decl(handle).ok()
    }

    /// Whether `candidate` may appear where `head` is expected
    pub fn is_substitutable(&self, candidate: &QualifiedName, head: &QualifiedName) -> bool {
        if candidate == head {
            return true;
        }
        let (Ok(head_uri), Ok(head_local)) = (head.uri_str(self.names), head.local_str(self.names))
        else {
            return false;
        };
        let (Ok(uri), Ok(local)) = (candidate.uri_str(self.names), candidate.local_str(self.names))
        else {
            return false;
        };

        let mut current = (uri.to_string(), local.to_string());
        for hop in 1..=self.max_depth {
            let Some(decl) = self.top_level_decl(&current.0, &current.1) else {
                return false;
            };
            let Some(link) = decl.link(self.link) else {
                return false;
            };
            let Ok((uri, local)) = link.split() else {
                debug!(link = %link, "malformed head link");
                return false;
            };
            if uri == head_uri && local == head_local {
                debug!(hops = hop, "substitution resolved");
                return true;
            }
            current = (uri.to_string(), local.to_string());
        }
        debug!(
            max_depth = self.max_depth,
            candidate = %candidate.display(self.names),
            head = %head.display(self.names),
            "substitution walk exceeded hop limit"
        );
        false
    }

    /// Direct head of `element`, if its link names an interned element
    pub fn head_of(&self, element: &QualifiedName) -> Option<QualifiedName> {
        let uri = element.uri_str(self.names).ok()?;
        let local = element.local_str(self.names).ok()?;
        let link = self.top_level_decl(uri, local)?.link(self.link)?;
        let (uri, local) = link.split().ok()?;
        QualifiedName::lookup(self.names, uri, local)
    }
}

impl NameMatcher for SubstitutionResolver<'_> {
    fn matches(&self, candidate: &QualifiedName, expected: &QualifiedName) -> bool {
        self.is_substitutable(candidate, expected)
    }
}
