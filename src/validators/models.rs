//! Content model validation and insertion analysis
//!
//! A [`ContentModel`] is compiled once from an element's [`ContentKind`] and
//! then answers two questions about an observed child sequence:
//!
//! - [`ContentModel::validate`]: is the sequence valid, and if not, where
//!   does it first fail;
//! - [`ContentModel::what_can_go_here`]: which element names may be
//!   inserted at an offset, and may the content end there.
//!
//! Trees made of a single operator over leaves are handled by the flat
//! [`SimpleContentModel`]; every other tree is compiled into a
//! [`PositionAutomaton`]. Both report failures with the same indexing.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cvc-model-group

use std::collections::HashSet;

use tracing::trace;

use crate::error::{Error, Result};
use crate::grammar::{ContentKind, ContentSpecIndex, ContentSpecNode, Grammar};
use crate::namespaces::QualifiedName;

use super::automaton::PositionAutomaton;
use super::simple::SimpleContentModel;

// =============================================================================
// Shared result types
// =============================================================================

/// One observed child of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Child {
    /// A child element
    Element(QualifiedName),
    /// Character data
    PcData,
}

impl Child {
    /// Element name, if this child is an element
    pub fn name(&self) -> Option<&QualifiedName> {
        match self {
            Child::Element(name) => Some(name),
            Child::PcData => None,
        }
    }

    /// Whether this child is character data
    pub fn is_pcdata(&self) -> bool {
        matches!(self, Child::PcData)
    }
}

impl From<QualifiedName> for Child {
    fn from(name: QualifiedName) -> Self {
        Child::Element(name)
    }
}

/// Outcome of validating a child sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidResult {
    /// The sequence is complete and valid
    FullyValid,
    /// Every child was consumed but the model needs more content
    ValidPrefix {
        /// Number of children consumed
        consumed: usize,
    },
    /// The child at this position cannot continue the match
    InvalidAt(usize),
}

impl ValidResult {
    /// Whether the sequence is complete and valid
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidResult::FullyValid)
    }

    /// Position reported to callers for a non-valid outcome; a valid prefix
    /// reports the child count
    pub fn error_index(&self) -> Option<usize> {
        match *self {
            ValidResult::FullyValid => None,
            ValidResult::ValidPrefix { consumed } => Some(consumed),
            ValidResult::InvalidAt(index) => Some(index),
        }
    }
}

/// Equality test between an observed element and an expected one
///
/// The plain test is name identity; a substitution resolver widens it to
/// substitution-group membership.
pub trait NameMatcher {
    /// Whether `candidate` may appear where `expected` is declared
    fn matches(&self, candidate: &QualifiedName, expected: &QualifiedName) -> bool;
}

/// Name identity
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl NameMatcher for ExactMatch {
    fn matches(&self, candidate: &QualifiedName, expected: &QualifiedName) -> bool {
        candidate == expected
    }
}

/// Whether a child matches an expected element name
pub(crate) fn child_matches(
    child: &Child,
    expected: &QualifiedName,
    matcher: &dyn NameMatcher,
) -> bool {
    match child {
        Child::Element(name) => matcher.matches(name, expected),
        Child::PcData => false,
    }
}

/// A name that could be inserted, with its legality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertCandidate {
    /// Element name
    pub name: QualifiedName,
    /// Whether inserting it at the offset is legal
    pub valid: bool,
}

/// Outcome of an insertion-point query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsertResult {
    /// First invalid child before the insertion offset
    pub failed_index: Option<usize>,
    /// Names the model knows about, each flagged as insertable or not
    pub candidates: Vec<InsertCandidate>,
    /// Whether the content may end at the offset
    pub is_valid_eoc: bool,
    /// Whether character data may be inserted at the offset
    pub can_hold_pcdata: bool,
}

impl InsertResult {
    /// Result for a prefix that already fails at `index`
    pub fn failed(index: usize) -> Self {
        Self {
            failed_index: Some(index),
            ..Self::default()
        }
    }

    /// Record a candidate; a name seen twice is insertable if either
    /// occurrence is
    pub fn push_candidate(&mut self, name: QualifiedName, valid: bool) {
        match self.candidates.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.valid |= valid,
            None => self.candidates.push(InsertCandidate { name, valid }),
        }
    }

    /// Names that may legally be inserted
    pub fn valid_names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.candidates.iter().filter(|c| c.valid).map(|c| &c.name)
    }

    /// Whether `name` may legally be inserted
    pub fn is_insertable(&self, name: &QualifiedName) -> bool {
        self.candidates.iter().any(|c| c.valid && &c.name == name)
    }
}

/// Reject offsets past the end of the child list
pub(crate) fn check_offset(children: &[Child], insert_at: usize) -> Result<()> {
    if insert_at > children.len() {
        return Err(Error::InvalidOffset {
            offset: insert_at,
            len: children.len(),
        });
    }
    Ok(())
}

// =============================================================================
// Mixed content
// =============================================================================

/// Character data interleaved with any of a set of element names
///
/// Order and occurrence are not enforced for mixed content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MixedContentModel {
    names: Vec<QualifiedName>,
}

impl MixedContentModel {
    /// Collect the leaf names under `root`
    pub fn build(grammar: &Grammar, root: Option<ContentSpecIndex>) -> Result<Self> {
        let mut names = Vec::new();
        if let Some(root) = root {
            let mut seen = HashSet::new();
            let mut stack = vec![(root, 0usize)];
            while let Some((node, depth)) = stack.pop() {
                grammar.limits().check_content_spec_depth(depth)?;
                match *grammar.content_spec(node)? {
                    ContentSpecNode::Leaf(name) => {
                        if seen.insert(name) {
                            names.push(name);
                        }
                    }
                    other => {
                        // reverse so leaves come out in document order
                        let operands: Vec<_> = other.operands().collect();
                        stack.extend(operands.into_iter().rev().map(|child| (child, depth + 1)));
                    }
                }
            }
        }
        Ok(Self { names })
    }

    /// Allowed element names
    pub fn names(&self) -> &[QualifiedName] {
        &self.names
    }

    fn allows(&self, child: &Child, matcher: &dyn NameMatcher) -> bool {
        match child {
            Child::PcData => true,
            Child::Element(_) => self.names.iter().any(|n| child_matches(child, n, matcher)),
        }
    }

    /// Validate children
    pub fn validate(&self, children: &[Child], matcher: &dyn NameMatcher) -> ValidResult {
        match children.iter().position(|c| !self.allows(c, matcher)) {
            Some(index) => ValidResult::InvalidAt(index),
            None => ValidResult::FullyValid,
        }
    }

    /// Insertion analysis
    pub fn what_can_go_here(
        &self,
        children: &[Child],
        insert_at: usize,
        matcher: &dyn NameMatcher,
    ) -> InsertResult {
        if let Some(index) = children[..insert_at].iter().position(|c| !self.allows(c, matcher)) {
            return InsertResult::failed(index);
        }
        let mut result = InsertResult {
            is_valid_eoc: true,
            can_hold_pcdata: true,
            ..InsertResult::default()
        };
        for name in &self.names {
            result.push_candidate(*name, true);
        }
        result
    }
}

// =============================================================================
// Compiled content model
// =============================================================================

/// A content model ready to be queried
#[derive(Debug, Clone)]
pub enum ContentModel {
    /// No children, no character data
    Empty,
    /// Anything
    Any,
    /// Character data only (simple content)
    Text,
    /// Character data and unordered elements
    Mixed(MixedContentModel),
    /// A single operator over leaves
    Simple(SimpleContentModel),
    /// Any other element-only tree
    General(PositionAutomaton),
}

impl ContentModel {
    /// Compile the model of a content kind
    pub fn build(grammar: &Grammar, content: &ContentKind) -> Result<Self> {
        match content {
            ContentKind::Empty => Ok(ContentModel::Empty),
            ContentKind::Any => Ok(ContentModel::Any),
            ContentKind::Simple(_) => Ok(ContentModel::Text),
            ContentKind::Mixed(root) => Ok(ContentModel::Mixed(MixedContentModel::build(grammar, *root)?)),
            ContentKind::Children(root) => Self::from_spec(grammar, *root),
        }
    }

    /// Compile an element-only content-spec tree
    pub fn from_spec(grammar: &Grammar, root: ContentSpecIndex) -> Result<Self> {
        if let Some(simple) = SimpleContentModel::from_spec(grammar, root)? {
            trace!(root = root.index(), op = ?simple.op(), "compiled flat content model");
            return Ok(ContentModel::Simple(simple));
        }
        let automaton = PositionAutomaton::build(grammar, root)?;
        trace!(
            root = root.index(),
            positions = automaton.position_count(),
            "compiled position automaton"
        );
        Ok(ContentModel::General(automaton))
    }

    /// Validate an observed child sequence
    pub fn validate(&self, children: &[Child], matcher: &dyn NameMatcher) -> ValidResult {
        match self {
            ContentModel::Empty => match children.is_empty() {
                true => ValidResult::FullyValid,
                false => ValidResult::InvalidAt(0),
            },
            ContentModel::Any => ValidResult::FullyValid,
            ContentModel::Text => match children.iter().position(|c| !c.is_pcdata()) {
                Some(index) => ValidResult::InvalidAt(index),
                None => ValidResult::FullyValid,
            },
            ContentModel::Mixed(model) => model.validate(children, matcher),
            ContentModel::Simple(model) => model.validate(children, matcher),
            ContentModel::General(model) => model.validate(children, matcher),
        }
    }

    /// Report what may be inserted at `insert_at`
    ///
    /// With `fully_valid` set, a name only counts as insertable if the
    /// children after the offset can still follow it.
    pub fn what_can_go_here(
        &self,
        fully_valid: bool,
        children: &[Child],
        insert_at: usize,
        matcher: &dyn NameMatcher,
    ) -> Result<InsertResult> {
        check_offset(children, insert_at)?;
        let result = match self {
            ContentModel::Empty => match children.is_empty() {
                true => InsertResult {
                    is_valid_eoc: true,
                    ..InsertResult::default()
                },
                false => InsertResult::failed(0),
            },
            ContentModel::Any => InsertResult {
                is_valid_eoc: true,
                can_hold_pcdata: true,
                ..InsertResult::default()
            },
            ContentModel::Text => match children[..insert_at].iter().position(|c| !c.is_pcdata()) {
                Some(index) => InsertResult::failed(index),
                None => InsertResult {
                    is_valid_eoc: true,
                    can_hold_pcdata: true,
                    ..InsertResult::default()
                },
            },
            ContentModel::Mixed(model) => model.what_can_go_here(children, insert_at, matcher),
            ContentModel::Simple(model) => {
                model.what_can_go_here(fully_valid, children, insert_at, matcher)?
            }
            ContentModel::General(model) => {
                model.what_can_go_here(fully_valid, children, insert_at, matcher)?
            }
        };
        Ok(result)
    }

    /// Short description for logs and summaries
    pub fn strategy(&self) -> &'static str {
        match self {
            ContentModel::Empty => "empty",
            ContentModel::Any => "any",
            ContentModel::Text => "text",
            ContentModel::Mixed(_) => "mixed",
            ContentModel::Simple(_) => "flat",
            ContentModel::General(_) => "automaton",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    fn names(table: &mut SymbolTable) -> (QualifiedName, QualifiedName, QualifiedName) {
        (
            QualifiedName::intern(table, "", "a"),
            QualifiedName::intern(table, "", "b"),
            QualifiedName::intern(table, "", "c"),
        )
    }

    #[test]
    fn test_valid_result_error_index() {
        assert_eq!(ValidResult::FullyValid.error_index(), None);
        assert_eq!(ValidResult::ValidPrefix { consumed: 1 }.error_index(), Some(1));
        assert_eq!(ValidResult::InvalidAt(3).error_index(), Some(3));
        assert!(!ValidResult::ValidPrefix { consumed: 0 }.is_valid());
    }

    #[test]
    fn test_push_candidate_merges() {
        let mut table = SymbolTable::new();
        let (a, _, _) = names(&mut table);
        let mut result = InsertResult::default();
        result.push_candidate(a, false);
        result.push_candidate(a, true);
        assert_eq!(result.candidates.len(), 1);
        assert!(result.is_insertable(&a));
    }

    #[test]
    fn test_empty_and_any() {
        let mut table = SymbolTable::new();
        let (a, _, _) = names(&mut table);
        let children = [Child::Element(a)];
        assert_eq!(ContentModel::Empty.validate(&[], &ExactMatch), ValidResult::FullyValid);
        assert_eq!(ContentModel::Empty.validate(&children, &ExactMatch), ValidResult::InvalidAt(0));
        assert_eq!(ContentModel::Any.validate(&children, &ExactMatch), ValidResult::FullyValid);
    }

    #[test]
    fn test_text_rejects_elements() {
        let mut table = SymbolTable::new();
        let (a, _, _) = names(&mut table);
        let children = [Child::PcData, Child::Element(a)];
        assert_eq!(ContentModel::Text.validate(&children, &ExactMatch), ValidResult::InvalidAt(1));
    }

    #[test]
    fn test_mixed_content() {
        let mut table = SymbolTable::new();
        let (a, b, c) = names(&mut table);
        let mut grammar = Grammar::new(None);
        let la = grammar.add_content_spec(ContentSpecNode::Leaf(a)).unwrap();
        let lb = grammar.add_content_spec(ContentSpecNode::Leaf(b)).unwrap();
        let choice = grammar.add_content_spec(ContentSpecNode::Choice(la, lb)).unwrap();
        let star = grammar.add_content_spec(ContentSpecNode::ZeroOrMore(choice)).unwrap();

        let model = ContentModel::build(&grammar, &ContentKind::Mixed(Some(star))).unwrap();
        let children = [Child::PcData, Child::Element(b), Child::PcData, Child::Element(a)];
        assert_eq!(model.validate(&children, &ExactMatch), ValidResult::FullyValid);
        let children = [Child::Element(a), Child::Element(c)];
        assert_eq!(model.validate(&children, &ExactMatch), ValidResult::InvalidAt(1));

        let insert = model.what_can_go_here(true, &[], 0, &ExactMatch).unwrap();
        assert!(insert.can_hold_pcdata);
        assert!(insert.is_insertable(&a) && insert.is_insertable(&b));
    }

    #[test]
    fn test_offset_past_end() {
        let err = ContentModel::Any.what_can_go_here(false, &[], 1, &ExactMatch).unwrap_err();
        assert!(matches!(err, Error::InvalidOffset { offset: 1, len: 0 }));
    }

    #[test]
    fn test_strategy_selection() {
        let mut table = SymbolTable::new();
        let (a, b, _) = names(&mut table);
        let mut grammar = Grammar::new(None);
        let la = grammar.add_content_spec(ContentSpecNode::Leaf(a)).unwrap();
        let lb = grammar.add_content_spec(ContentSpecNode::Leaf(b)).unwrap();
        let seq = grammar.add_content_spec(ContentSpecNode::Sequence(la, lb)).unwrap();
        let star = grammar.add_content_spec(ContentSpecNode::ZeroOrMore(seq)).unwrap();

        assert_eq!(ContentModel::from_spec(&grammar, seq).unwrap().strategy(), "flat");
        assert_eq!(ContentModel::from_spec(&grammar, star).unwrap().strategy(), "automaton");
    }
}
