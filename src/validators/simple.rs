//! Flat content models
//!
//! A content-spec tree whose root is a single operator over leaves
//! (`a`, `a?`, `a*`, `a+`, `a|b`, `a,b`) is validated by direct case
//! analysis. Insertion analysis reuses the same per-position acceptance
//! test so the two can never disagree.

use crate::error::Result;
use crate::grammar::{ContentSpecIndex, ContentSpecNode, Grammar};
use crate::namespaces::QualifiedName;

use super::models::{check_offset, child_matches, Child, InsertResult, NameMatcher, ValidResult};

/// Operator of a flat model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleOp {
    /// Exactly one `first`
    Leaf,
    /// At most one `first`
    ZeroOrOne,
    /// Any number of `first`
    ZeroOrMore,
    /// At least one `first`
    OneOrMore,
    /// Exactly one of `first` or `second`
    Choice,
    /// `first` followed by `second`
    Sequence,
}

/// A single operator over one or two element names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleContentModel {
    op: SimpleOp,
    first: QualifiedName,
    second: Option<QualifiedName>,
}

impl SimpleContentModel {
    /// Build a unary or leaf model
    pub fn unary(op: SimpleOp, name: QualifiedName) -> Self {
        Self {
            op,
            first: name,
            second: None,
        }
    }

    /// Build a choice or sequence model
    pub fn binary(op: SimpleOp, first: QualifiedName, second: QualifiedName) -> Self {
        Self {
            op,
            first,
            second: Some(second),
        }
    }

    /// Flat model for the tree at `root`, or `None` if the tree is deeper
    pub fn from_spec(grammar: &Grammar, root: ContentSpecIndex) -> Result<Option<Self>> {
        let leaf = |handle: ContentSpecIndex| -> Result<Option<QualifiedName>> {
            match *grammar.content_spec(handle)? {
                ContentSpecNode::Leaf(name) => Ok(Some(name)),
                _ => Ok(None),
            }
        };

        let model = match *grammar.content_spec(root)? {
            ContentSpecNode::Leaf(name) => Some(Self::unary(SimpleOp::Leaf, name)),
            ContentSpecNode::ZeroOrOne(child) => leaf(child)?.map(|n| Self::unary(SimpleOp::ZeroOrOne, n)),
            ContentSpecNode::ZeroOrMore(child) => leaf(child)?.map(|n| Self::unary(SimpleOp::ZeroOrMore, n)),
            ContentSpecNode::OneOrMore(child) => leaf(child)?.map(|n| Self::unary(SimpleOp::OneOrMore, n)),
            ContentSpecNode::Choice(a, b) => match (leaf(a)?, leaf(b)?) {
                (Some(a), Some(b)) => Some(Self::binary(SimpleOp::Choice, a, b)),
                _ => None,
            },
            ContentSpecNode::Sequence(a, b) => match (leaf(a)?, leaf(b)?) {
                (Some(a), Some(b)) => Some(Self::binary(SimpleOp::Sequence, a, b)),
                _ => None,
            },
        };
        Ok(model)
    }

    /// Operator
    pub fn op(&self) -> SimpleOp {
        self.op
    }

    /// Operand names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        std::iter::once(&self.first).chain(self.second.as_ref())
    }

    fn matches_first(&self, child: &Child, matcher: &dyn NameMatcher) -> bool {
        child_matches(child, &self.first, matcher)
    }

    fn matches_second(&self, child: &Child, matcher: &dyn NameMatcher) -> bool {
        self.second
            .as_ref()
            .is_some_and(|second| child_matches(child, second, matcher))
    }

    /// Whether `child` may stand at position `pos`
    fn accepts_at(&self, pos: usize, child: &Child, matcher: &dyn NameMatcher) -> bool {
        match self.op {
            SimpleOp::Leaf | SimpleOp::ZeroOrOne => pos == 0 && self.matches_first(child, matcher),
            SimpleOp::ZeroOrMore | SimpleOp::OneOrMore => self.matches_first(child, matcher),
            SimpleOp::Choice => {
                pos == 0 && (self.matches_first(child, matcher) || self.matches_second(child, matcher))
            }
            SimpleOp::Sequence => match pos {
                0 => self.matches_first(child, matcher),
                1 => self.matches_second(child, matcher),
                _ => false,
            },
        }
    }

    /// Validate children
    pub fn validate(&self, children: &[Child], matcher: &dyn NameMatcher) -> ValidResult {
        let len = children.len();
        match self.op {
            SimpleOp::Leaf | SimpleOp::Choice => {
                if len == 0 {
                    return ValidResult::InvalidAt(0);
                }
                if !self.accepts_at(0, &children[0], matcher) {
                    return ValidResult::InvalidAt(0);
                }
                if len > 1 {
                    return ValidResult::InvalidAt(1);
                }
                ValidResult::FullyValid
            }
            SimpleOp::ZeroOrOne => {
                if len == 0 {
                    return ValidResult::FullyValid;
                }
                if !self.accepts_at(0, &children[0], matcher) {
                    return ValidResult::InvalidAt(0);
                }
                if len > 1 {
                    return ValidResult::InvalidAt(1);
                }
                ValidResult::FullyValid
            }
            SimpleOp::ZeroOrMore | SimpleOp::OneOrMore => {
                if len == 0 && self.op == SimpleOp::OneOrMore {
                    return ValidResult::InvalidAt(0);
                }
                match children.iter().position(|c| !self.matches_first(c, matcher)) {
                    Some(index) => ValidResult::InvalidAt(index),
                    None => ValidResult::FullyValid,
                }
            }
            SimpleOp::Sequence => {
                for (pos, child) in children.iter().enumerate().take(2) {
                    if !self.accepts_at(pos, child, matcher) {
                        return ValidResult::InvalidAt(pos);
                    }
                }
                match len {
                    0 | 1 => ValidResult::ValidPrefix { consumed: len },
                    2 => ValidResult::FullyValid,
                    _ => ValidResult::InvalidAt(2),
                }
            }
        }
    }

    /// Insertion analysis at `insert_at`
    ///
    /// End of content follows [`validate`](Self::validate): a mandatory leaf
    /// may only end once its child precedes the insertion point
    /// (`insert_at == 1`), an optional leaf at `insert_at <= 1`, a choice
    /// after its single child and a sequence after both operands.
    pub fn what_can_go_here(
        &self,
        fully_valid: bool,
        children: &[Child],
        insert_at: usize,
        matcher: &dyn NameMatcher,
    ) -> Result<InsertResult> {
        check_offset(children, insert_at)?;
        for (pos, child) in children[..insert_at].iter().enumerate() {
            if !self.accepts_at(pos, child, matcher) {
                return Ok(InsertResult::failed(pos));
            }
        }

        let count = children.len();
        let mut result = InsertResult::default();
        match self.op {
            SimpleOp::Leaf | SimpleOp::ZeroOrOne => {
                let valid = insert_at == 0 && (!fully_valid || count == 0);
                result.push_candidate(self.first, valid);
                result.is_valid_eoc = match self.op {
                    SimpleOp::Leaf => insert_at == 1,
                    _ => insert_at <= 1,
                };
            }
            SimpleOp::ZeroOrMore => {
                result.push_candidate(self.first, true);
                result.is_valid_eoc = true;
            }
            SimpleOp::OneOrMore => {
                result.push_candidate(self.first, true);
                result.is_valid_eoc = insert_at > 0;
            }
            SimpleOp::Choice => {
                let valid = insert_at == 0 && (!fully_valid || count == 0);
                for name in self.names() {
                    result.push_candidate(*name, valid);
                }
                result.is_valid_eoc = insert_at == 1;
            }
            SimpleOp::Sequence => {
                // inserting `first` ahead of a lone child keeps the sequence
                // valid only when that child is the second operand
                let first_valid = insert_at == 0
                    && (!fully_valid
                        || count == 0
                        || (count == 1 && self.matches_second(&children[0], matcher)));
                let second_valid = insert_at == 1 && (!fully_valid || count < 2);
                result.push_candidate(self.first, first_valid);
                if let Some(second) = self.second {
                    result.push_candidate(second, second_valid);
                }
                result.is_valid_eoc = insert_at == 2;
            }
        }
        Ok(result)
    }
}
