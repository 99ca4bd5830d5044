//! Property tests for the content models
//!
//! Flat single-operator trees can be compiled both ways; the flat model and
//! the position automaton must agree on them.

use proptest::prelude::*;

use xmlschema_grammar::validators::{ExactMatch, PositionAutomaton, SimpleContentModel};
use xmlschema_grammar::{
    Child, ContentModel, ContentSpecIndex, ContentSpecNode, Grammar, QualifiedName, SymbolTable,
};

struct Tree {
    grammar: Grammar,
    names: Vec<QualifiedName>,
    root: ContentSpecIndex,
}

/// Build a flat tree: `op` selects the operator, `x`/`y` the operand names
fn flat_tree(op: usize, x: usize, y: usize) -> Tree {
    let mut table = SymbolTable::new();
    let names: Vec<QualifiedName> = ["a", "b", "c"]
        .iter()
        .map(|local| QualifiedName::intern(&mut table, "", local))
        .collect();
    let mut grammar = Grammar::new(None);
    let first = grammar.add_content_spec(ContentSpecNode::Leaf(names[x])).unwrap();
    let second = grammar.add_content_spec(ContentSpecNode::Leaf(names[y])).unwrap();
    let node = match op {
        0 => None,
        1 => Some(ContentSpecNode::ZeroOrOne(first)),
        2 => Some(ContentSpecNode::ZeroOrMore(first)),
        3 => Some(ContentSpecNode::OneOrMore(first)),
        4 => Some(ContentSpecNode::Choice(first, second)),
        _ => Some(ContentSpecNode::Sequence(first, second)),
    };
    let root = match node {
        Some(node) => grammar.add_content_spec(node).unwrap(),
        None => first,
    };
    Tree { grammar, names, root }
}

fn children(tree: &Tree, picks: &[usize]) -> Vec<Child> {
    picks.iter().map(|&i| Child::Element(tree.names[i])).collect()
}

proptest! {
    #[test]
    fn prop_validation_is_deterministic(
        op in 0usize..6,
        x in 0usize..3,
        y in 0usize..3,
        picks in prop::collection::vec(0usize..3, 0..6),
    ) {
        let tree = flat_tree(op, x, y);
        let kids = children(&tree, &picks);
        let first = ContentModel::from_spec(&tree.grammar, tree.root).unwrap().validate(&kids, &ExactMatch);
        let second = ContentModel::from_spec(&tree.grammar, tree.root).unwrap().validate(&kids, &ExactMatch);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_flat_and_automaton_agree(
        op in 0usize..6,
        x in 0usize..3,
        y in 0usize..3,
        picks in prop::collection::vec(0usize..3, 0..6),
    ) {
        let tree = flat_tree(op, x, y);
        let kids = children(&tree, &picks);
        let flat = SimpleContentModel::from_spec(&tree.grammar, tree.root).unwrap().unwrap();
        let automaton = PositionAutomaton::build(&tree.grammar, tree.root).unwrap();

        let expected = flat.validate(&kids, &ExactMatch);
        let actual = automaton.validate(&kids, &ExactMatch);
        prop_assert_eq!(expected.is_valid(), actual.is_valid());
        prop_assert_eq!(expected.error_index(), actual.error_index());
    }

    #[test]
    fn prop_insertion_agrees_on_valid_prefixes(
        op in 0usize..6,
        x in 0usize..3,
        y in 0usize..3,
        picks in prop::collection::vec(0usize..3, 0..4),
        offset in 0usize..4,
    ) {
        let tree = flat_tree(op, x, y);
        let kids = children(&tree, &picks);
        let insert_at = offset.min(kids.len());
        let flat = SimpleContentModel::from_spec(&tree.grammar, tree.root).unwrap().unwrap();
        let automaton = PositionAutomaton::build(&tree.grammar, tree.root).unwrap();

        let expected = flat.what_can_go_here(false, &kids, insert_at, &ExactMatch).unwrap();
        let actual = automaton.what_can_go_here(false, &kids, insert_at, &ExactMatch).unwrap();
        prop_assume!(expected.failed_index.is_none());
        prop_assert_eq!(actual.failed_index, None);
        prop_assert_eq!(expected.is_valid_eoc, actual.is_valid_eoc);
        let expected_names: Vec<_> = expected.valid_names().copied().collect();
        let actual_names: Vec<_> = actual.valid_names().copied().collect();
        prop_assert_eq!(expected_names, actual_names);
    }

    #[test]
    fn prop_insertion_offset_checked(
        picks in prop::collection::vec(0usize..3, 0..4),
        extra in 1usize..4,
    ) {
        let tree = flat_tree(2, 0, 0);
        let kids = children(&tree, &picks);
        let model = ContentModel::from_spec(&tree.grammar, tree.root).unwrap();
        prop_assert!(model.what_can_go_here(false, &kids, kids.len() + extra, &ExactMatch).is_err());
    }
}
