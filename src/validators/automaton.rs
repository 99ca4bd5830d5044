//! Position automata for general content models
//!
//! Content-spec trees that nest operators are compiled with the Glushkov
//! construction: every leaf occurrence becomes a position, and the
//! first/last/follow sets of the tree define the transitions. Matching
//! simulates the set of live positions, so non-deterministic models are
//! handled without backtracking.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cvc-particle

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::grammar::{ContentSpecIndex, ContentSpecNode, Grammar};
use crate::namespaces::QualifiedName;

use super::models::{check_offset, child_matches, Child, InsertResult, NameMatcher, ValidResult};

type Positions = BTreeSet<usize>;

/// Glushkov automaton of a content-spec tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAutomaton {
    positions: Vec<QualifiedName>,
    first: Positions,
    last: Positions,
    follow: Vec<Positions>,
    nullable: bool,
}

/// Sets computed for one subtree
struct Fragment {
    nullable: bool,
    first: Positions,
    last: Positions,
}

/// Simulation state: the positions matched by the last child, or the start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatonState {
    at_start: bool,
    current: Positions,
}

impl PositionAutomaton {
    /// Compile the tree rooted at `root`
    pub fn build(grammar: &Grammar, root: ContentSpecIndex) -> Result<Self> {
        let mut automaton = Self {
            positions: Vec::new(),
            first: Positions::new(),
            last: Positions::new(),
            follow: Vec::new(),
            nullable: false,
        };
        let fragment = automaton.visit(grammar, root, 0).map_err(|e| match e {
            Error::LimitExceeded(msg) => {
                Error::Internal(format!("content model too deep or cyclic: {}", msg))
            }
            other => other,
        })?;
        automaton.first = fragment.first;
        automaton.last = fragment.last;
        automaton.nullable = fragment.nullable;
        Ok(automaton)
    }

    fn visit(&mut self, grammar: &Grammar, node: ContentSpecIndex, depth: usize) -> Result<Fragment> {
        grammar.limits().check_content_spec_depth(depth)?;
        let fragment = match *grammar.content_spec(node)? {
            ContentSpecNode::Leaf(name) => {
                grammar.limits().check_content_spec_nodes(self.positions.len() + 1)?;
                let position = self.positions.len();
                self.positions.push(name);
                self.follow.push(Positions::new());
                Fragment {
                    nullable: false,
                    first: Positions::from([position]),
                    last: Positions::from([position]),
                }
            }
            ContentSpecNode::ZeroOrOne(child) => {
                let inner = self.visit(grammar, child, depth + 1)?;
                Fragment {
                    nullable: true,
                    ..inner
                }
            }
            ContentSpecNode::ZeroOrMore(child) => {
                let inner = self.visit(grammar, child, depth + 1)?;
                self.link(&inner.last, &inner.first);
                Fragment {
                    nullable: true,
                    ..inner
                }
            }
            ContentSpecNode::OneOrMore(child) => {
                let inner = self.visit(grammar, child, depth + 1)?;
                self.link(&inner.last, &inner.first);
                inner
            }
            ContentSpecNode::Choice(a, b) => {
                let left = self.visit(grammar, a, depth + 1)?;
                let right = self.visit(grammar, b, depth + 1)?;
                Fragment {
                    nullable: left.nullable || right.nullable,
                    first: left.first.union(&right.first).copied().collect(),
                    last: left.last.union(&right.last).copied().collect(),
                }
            }
            ContentSpecNode::Sequence(a, b) => {
                let left = self.visit(grammar, a, depth + 1)?;
                let right = self.visit(grammar, b, depth + 1)?;
                self.link(&left.last, &right.first);
                let mut first = left.first;
                if left.nullable {
                    first.extend(&right.first);
                }
                let mut last = right.last;
                if right.nullable {
                    last.extend(&left.last);
                }
                Fragment {
                    nullable: left.nullable && right.nullable,
                    first,
                    last,
                }
            }
        };
        Ok(fragment)
    }

    fn link(&mut self, from: &Positions, to: &Positions) {
        for &position in from {
            self.follow[position].extend(to);
        }
    }

    /// Number of leaf positions
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether the empty sequence is accepted
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Distinct element names in first-occurrence order
    pub fn names(&self) -> Vec<QualifiedName> {
        let mut names: Vec<QualifiedName> = Vec::new();
        for name in &self.positions {
            if !names.contains(name) {
                names.push(*name);
            }
        }
        names
    }

    /// State before any child
    pub fn start(&self) -> AutomatonState {
        AutomatonState {
            at_start: true,
            current: Positions::new(),
        }
    }

    fn next_positions(&self, state: &AutomatonState) -> Positions {
        if state.at_start {
            return self.first.clone();
        }
        state
            .current
            .iter()
            .flat_map(|&p| self.follow[p].iter().copied())
            .collect()
    }

    /// Consume one child; `None` when no position can take it
    pub fn step(
        &self,
        state: &AutomatonState,
        child: &Child,
        matcher: &dyn NameMatcher,
    ) -> Option<AutomatonState> {
        let current: Positions = self
            .next_positions(state)
            .into_iter()
            .filter(|&p| child_matches(child, &self.positions[p], matcher))
            .collect();
        if current.is_empty() {
            return None;
        }
        Some(AutomatonState {
            at_start: false,
            current,
        })
    }

    /// Whether the content may end in `state`
    pub fn is_accepting(&self, state: &AutomatonState) -> bool {
        if state.at_start {
            return self.nullable;
        }
        state.current.iter().any(|p| self.last.contains(p))
    }

    /// Run children from `state`; the error is the offset of the first
    /// child that could not be consumed
    fn run(
        &self,
        mut state: AutomatonState,
        children: &[Child],
        matcher: &dyn NameMatcher,
    ) -> std::result::Result<AutomatonState, usize> {
        for (index, child) in children.iter().enumerate() {
            state = self.step(&state, child, matcher).ok_or(index)?;
        }
        Ok(state)
    }

    /// Validate children
    pub fn validate(&self, children: &[Child], matcher: &dyn NameMatcher) -> ValidResult {
        match self.run(self.start(), children, matcher) {
            Err(index) => ValidResult::InvalidAt(index),
            Ok(state) if self.is_accepting(&state) => ValidResult::FullyValid,
            Ok(_) => ValidResult::ValidPrefix {
                consumed: children.len(),
            },
        }
    }

    /// Insertion analysis at `insert_at`
    pub fn what_can_go_here(
        &self,
        fully_valid: bool,
        children: &[Child],
        insert_at: usize,
        matcher: &dyn NameMatcher,
    ) -> Result<InsertResult> {
        check_offset(children, insert_at)?;
        let state = match self.run(self.start(), &children[..insert_at], matcher) {
            Ok(state) => state,
            Err(index) => return Ok(InsertResult::failed(index)),
        };

        let mut result = InsertResult {
            is_valid_eoc: self.is_accepting(&state),
            ..InsertResult::default()
        };
        let remainder = &children[insert_at..];
        for name in self.names() {
            let inserted = self.step(&state, &Child::Element(name), matcher);
            let valid = match inserted {
                None => false,
                Some(_) if !fully_valid => true,
                Some(next) => self.run(next, remainder, matcher).is_ok(),
            };
            result.push_candidate(name, valid);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;
    use crate::validators::models::ExactMatch;

    struct Fixture {
        grammar: Grammar,
        a: QualifiedName,
        b: QualifiedName,
        c: QualifiedName,
    }

    fn fixture() -> Fixture {
        let mut table = SymbolTable::new();
        Fixture {
            grammar: Grammar::new(None),
            a: QualifiedName::intern(&mut table, "", "a"),
            b: QualifiedName::intern(&mut table, "", "b"),
            c: QualifiedName::intern(&mut table, "", "c"),
        }
    }

    fn leaf(grammar: &mut Grammar, name: QualifiedName) -> ContentSpecIndex {
        grammar.add_content_spec(ContentSpecNode::Leaf(name)).unwrap()
    }

    fn kids(names: &[QualifiedName]) -> Vec<Child> {
        names.iter().copied().map(Child::Element).collect()
    }

    /// (a, b*, c?)
    fn nested(f: &mut Fixture) -> ContentSpecIndex {
        let a = leaf(&mut f.grammar, f.a);
        let b = leaf(&mut f.grammar, f.b);
        let c = leaf(&mut f.grammar, f.c);
        let bs = f.grammar.add_content_spec(ContentSpecNode::ZeroOrMore(b)).unwrap();
        let copt = f.grammar.add_content_spec(ContentSpecNode::ZeroOrOne(c)).unwrap();
        let tail = f.grammar.add_content_spec(ContentSpecNode::Sequence(bs, copt)).unwrap();
        f.grammar.add_content_spec(ContentSpecNode::Sequence(a, tail)).unwrap()
    }

    #[test]
    fn test_nested_sequence() {
        let mut f = fixture();
        let root = nested(&mut f);
        let automaton = PositionAutomaton::build(&f.grammar, root).unwrap();
        assert_eq!(automaton.position_count(), 3);
        assert!(!automaton.is_nullable());

        assert_eq!(automaton.validate(&kids(&[f.a]), &ExactMatch), ValidResult::FullyValid);
        assert_eq!(
            automaton.validate(&kids(&[f.a, f.b, f.b, f.c]), &ExactMatch),
            ValidResult::FullyValid
        );
        assert_eq!(
            automaton.validate(&kids(&[f.a, f.c, f.b]), &ExactMatch),
            ValidResult::InvalidAt(2)
        );
        assert_eq!(automaton.validate(&[], &ExactMatch), ValidResult::ValidPrefix { consumed: 0 });
    }

    #[test]
    fn test_repeated_group() {
        let mut f = fixture();
        let a = leaf(&mut f.grammar, f.a);
        let b = leaf(&mut f.grammar, f.b);
        let seq = f.grammar.add_content_spec(ContentSpecNode::Sequence(a, b)).unwrap();
        let plus = f.grammar.add_content_spec(ContentSpecNode::OneOrMore(seq)).unwrap();
        let automaton = PositionAutomaton::build(&f.grammar, plus).unwrap();

        assert!(automaton.validate(&kids(&[f.a, f.b, f.a, f.b]), &ExactMatch).is_valid());
        assert_eq!(
            automaton.validate(&kids(&[f.a, f.b, f.a]), &ExactMatch),
            ValidResult::ValidPrefix { consumed: 3 }
        );
        assert_eq!(
            automaton.validate(&kids(&[f.a, f.a]), &ExactMatch),
            ValidResult::InvalidAt(1)
        );
    }

    #[test]
    fn test_shared_subtree_gets_distinct_positions() {
        let mut f = fixture();
        let a = leaf(&mut f.grammar, f.a);
        let opt = f.grammar.add_content_spec(ContentSpecNode::ZeroOrOne(a)).unwrap();
        let seq = f.grammar.add_content_spec(ContentSpecNode::Sequence(a, opt)).unwrap();
        let automaton = PositionAutomaton::build(&f.grammar, seq).unwrap();
        assert_eq!(automaton.position_count(), 2);
        assert!(automaton.validate(&kids(&[f.a, f.a]), &ExactMatch).is_valid());
        assert_eq!(
            automaton.validate(&kids(&[f.a, f.a, f.a]), &ExactMatch),
            ValidResult::InvalidAt(2)
        );
    }

    #[test]
    fn test_insertion() {
        let mut f = fixture();
        let root = nested(&mut f);
        let automaton = PositionAutomaton::build(&f.grammar, root).unwrap();
        let children = kids(&[f.a, f.c]);

        let result = automaton.what_can_go_here(false, &children, 1, &ExactMatch).unwrap();
        assert!(result.is_insertable(&f.b));
        assert!(result.is_insertable(&f.c));
        assert!(!result.is_insertable(&f.a));
        assert!(result.is_valid_eoc);

        // a second c would clash with the existing one
        let strict = automaton.what_can_go_here(true, &children, 1, &ExactMatch).unwrap();
        assert!(strict.is_insertable(&f.b));
        assert!(!strict.is_insertable(&f.c));

        let start = automaton.what_can_go_here(true, &children, 0, &ExactMatch).unwrap();
        assert!(!start.is_valid_eoc);
        assert_eq!(start.valid_names().count(), 0);
    }

    #[test]
    fn test_insertion_failed_prefix() {
        let mut f = fixture();
        let root = nested(&mut f);
        let automaton = PositionAutomaton::build(&f.grammar, root).unwrap();
        let result = automaton
            .what_can_go_here(false, &kids(&[f.b, f.a]), 2, &ExactMatch)
            .unwrap();
        assert_eq!(result.failed_index, Some(0));
    }

    #[test]
    fn test_depth_limit_is_internal() {
        let mut f = fixture();
        let mut node = leaf(&mut f.grammar, f.a);
        for _ in 0..300 {
            node = f.grammar.add_content_spec(ContentSpecNode::ZeroOrOne(node)).unwrap();
        }
        let err = PositionAutomaton::build(&f.grammar, node).unwrap_err();
        assert!(err.is_internal());
    }
}
