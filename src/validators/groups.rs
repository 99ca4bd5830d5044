//! Model groups and their flattening into content-spec trees
//!
//! Schema documents describe content with n-ary `xs:sequence` / `xs:choice`
//! groups whose particles carry arbitrary occurrence bounds. The grammar
//! store only knows binary `Sequence`/`Choice` nodes, the unary repetition
//! operators and single-element leaves, so every group is rewritten into
//! that shape before it is stored:
//!
//! - `(a, b, c)` becomes `Sequence(a, Sequence(b, c))` and longer groups are
//!   split at their midpoint, so nesting stays shallow,
//! - `a{2,4}` becomes `a, a, a?, a?` and `a{2,}` becomes `a, a+`,
//! - empty groups and `maxOccurs="0"` particles vanish.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Model_Groups

use crate::error::Result;
use crate::grammar::{ContentSpecIndex, ContentSpecNode, Grammar};
use crate::namespaces::QualifiedName;

use super::particles::Occurs;

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
}

impl ModelType {
    /// Parse from a schema element local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
        }
    }
}

/// A particle in a model group
#[derive(Debug, Clone, PartialEq)]
pub enum GroupParticle {
    /// Element leaf
    Element(QualifiedName, Occurs),
    /// Nested model group
    Group(ModelGroup),
}

/// An n-ary model group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelGroup {
    /// Compositor
    pub model: ModelType,
    /// Occurrence bounds of the group itself
    pub occurs: Occurs,
    /// Particles in declaration order
    pub particles: Vec<GroupParticle>,
}

impl ModelGroup {
    /// Create an empty group occurring once
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            occurs: Occurs::once(),
            particles: Vec::new(),
        }
    }

    /// Set the group's occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Append an element particle
    pub fn element(mut self, name: QualifiedName, occurs: Occurs) -> Self {
        self.particles.push(GroupParticle::Element(name, occurs));
        self
    }

    /// Append a nested group
    pub fn group(mut self, group: ModelGroup) -> Self {
        self.particles.push(GroupParticle::Group(group));
        self
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the group has no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Store the group as a binary content-spec tree; `None` when the group
    /// cannot contain any element.
    pub fn flatten(&self, grammar: &mut Grammar) -> Result<Option<ContentSpecIndex>> {
        let term = self.flatten_term(grammar)?;
        apply_occurs(grammar, term, self.occurs)
    }

    fn flatten_term(&self, grammar: &mut Grammar) -> Result<Option<ContentSpecIndex>> {
        let mut operands = Vec::with_capacity(self.particles.len());
        let mut emptiable_branch = false;
        for particle in &self.particles {
            let operand = match particle {
                GroupParticle::Element(name, occurs) => {
                    let leaf = grammar.add_content_spec(ContentSpecNode::Leaf(*name))?;
                    apply_occurs(grammar, Some(leaf), *occurs)?
                }
                GroupParticle::Group(group) => group.flatten(grammar)?,
            };
            match operand {
                Some(operand) => operands.push(operand),
                None => emptiable_branch = true,
            }
        }

        let combined = match self.model {
            ModelType::Sequence => fold_binary(grammar, &operands, ContentSpecNode::Sequence)?,
            ModelType::Choice => {
                let choice = fold_binary(grammar, &operands, ContentSpecNode::Choice)?;
                // an empty alternative makes the whole choice optional
                match choice {
                    Some(choice) if emptiable_branch => {
                        Some(grammar.add_content_spec(ContentSpecNode::ZeroOrOne(choice))?)
                    }
                    other => other,
                }
            }
        };
        Ok(combined)
    }
}

/// Fold operands into a balanced tree of binary nodes, keeping the nesting
/// depth logarithmic in the operand count
fn fold_binary(
    grammar: &mut Grammar,
    operands: &[ContentSpecIndex],
    node: fn(ContentSpecIndex, ContentSpecIndex) -> ContentSpecNode,
) -> Result<Option<ContentSpecIndex>> {
    if operands.is_empty() {
        return Ok(None);
    }
    fold_balanced(grammar, operands, node).map(Some)
}

fn fold_balanced(
    grammar: &mut Grammar,
    operands: &[ContentSpecIndex],
    node: fn(ContentSpecIndex, ContentSpecIndex) -> ContentSpecNode,
) -> Result<ContentSpecIndex> {
    if let [single] = operands {
        return Ok(*single);
    }
    let (left, right) = operands.split_at(operands.len() / 2);
    let left = fold_balanced(grammar, left, node)?;
    let right = fold_balanced(grammar, right, node)?;
    grammar.add_content_spec(node(left, right))
}

/// Wrap a term in the operators its occurrence bounds call for
fn apply_occurs(
    grammar: &mut Grammar,
    term: Option<ContentSpecIndex>,
    occurs: Occurs,
) -> Result<Option<ContentSpecIndex>> {
    let Some(term) = term else {
        return Ok(None);
    };
    if occurs.is_empty() {
        return Ok(None);
    }
    if occurs.is_direct() {
        let wrapped = match (occurs.min, occurs.max) {
            (1, Some(1)) => term,
            (0, Some(1)) => grammar.add_content_spec(ContentSpecNode::ZeroOrOne(term))?,
            (0, None) => grammar.add_content_spec(ContentSpecNode::ZeroOrMore(term))?,
            _ => grammar.add_content_spec(ContentSpecNode::OneOrMore(term))?,
        };
        return Ok(Some(wrapped));
    }

    let min = occurs.min as usize;
    let (required, optional) = match occurs.max {
        Some(max) => (min, (max as usize).saturating_sub(min)),
        None => (min.saturating_sub(1), 0),
    };
    let unbounded = usize::from(occurs.max.is_none());
    grammar.limits().check_occurs_expansion(required + optional + unbounded)?;

    let mut copies = vec![term; required];
    if optional > 0 {
        let zero_or_one = grammar.add_content_spec(ContentSpecNode::ZeroOrOne(term))?;
        copies.resize(required + optional, zero_or_one);
    }
    if occurs.max.is_none() {
        copies.push(grammar.add_content_spec(ContentSpecNode::OneOrMore(term))?);
    }
    fold_binary(grammar, &copies, ContentSpecNode::Sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::grammar::render_content_spec;
    use crate::symbols::SymbolTable;

    fn setup() -> (SymbolTable, Grammar, QualifiedName, QualifiedName, QualifiedName) {
        let mut table = SymbolTable::new();
        let a = QualifiedName::intern(&mut table, "", "a");
        let b = QualifiedName::intern(&mut table, "", "b");
        let c = QualifiedName::intern(&mut table, "", "c");
        (table, Grammar::new(None), a, b, c)
    }

    #[test]
    fn test_flatten_sequence() {
        let (table, mut grammar, a, b, c) = setup();
        let group = ModelGroup::new(ModelType::Sequence)
            .element(a, Occurs::once())
            .element(b, Occurs::optional())
            .element(c, Occurs::zero_or_more());
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "(a,(b?,c*))");
    }

    #[test]
    fn test_flatten_single_particle_group() {
        let (table, mut grammar, a, _, _) = setup();
        let group = ModelGroup::new(ModelType::Choice)
            .with_occurs(Occurs::one_or_more())
            .element(a, Occurs::once());
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "a+");
    }

    #[test]
    fn test_flatten_bounded_repetition() {
        let (table, mut grammar, a, _, _) = setup();
        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::new(2, Some(3)));
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "(a,(a,a?))");

        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::new(2, None));
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "(a,a+)");
    }

    #[test]
    fn test_flatten_empty_group() {
        let (_, mut grammar, a, _, _) = setup();
        assert_eq!(ModelGroup::new(ModelType::Sequence).flatten(&mut grammar).unwrap(), None);
        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::empty());
        assert_eq!(group.flatten(&mut grammar).unwrap(), None);
    }

    #[test]
    fn test_choice_with_empty_branch_is_optional() {
        let (table, mut grammar, a, b, _) = setup();
        let group = ModelGroup::new(ModelType::Choice)
            .element(a, Occurs::once())
            .group(ModelGroup::new(ModelType::Sequence))
            .element(b, Occurs::once());
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "(a|b)?");
    }
    #[test]
    fn test_wide_sequence_stays_shallow() {
        let (mut table, mut grammar, _, _, _) = setup();
        let mut group = ModelGroup::new(ModelType::Sequence);
        for i in 0..1000 {
            group = group.element(QualifiedName::intern(&mut table, "", &format!("e{}", i)), Occurs::once());
        }
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(grammar.content_spec_count(), 1000 + 999);
        let rendered = render_content_spec(&grammar, &table, root).unwrap();
        assert!(rendered.starts_with("(((((((((e0,(e1,e2))"));
        assert!(rendered.ends_with("e999))))))))))"));
    }

    #[test]
    fn test_flatten_balances_four_operands() {
        let (table, mut grammar, a, b, c) = setup();
        let group = ModelGroup::new(ModelType::Choice)
            .element(a, Occurs::once())
            .element(b, Occurs::once())
            .element(c, Occurs::once())
            .element(a, Occurs::optional());
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert_eq!(render_content_spec(&grammar, &table, root).unwrap(), "((a|b)|(c|a?))");
    }

    #[test]
    fn test_large_max_occurs_is_shallow() {
        let (table, mut grammar, a, _, _) = setup();
        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::new(0, Some(500)));
        let root = group.flatten(&mut grammar).unwrap().unwrap();
        assert!(render_content_spec(&grammar, &table, root).is_ok());
    }

    #[test]
    fn test_occurs_expansion_limit() {
        let (_, mut grammar, a, _, _) = setup();
        let nodes = grammar.content_spec_count();
        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::new(1, Some(4_000_000_000)));
        let err = group.flatten(&mut grammar).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));

        let group = ModelGroup::new(ModelType::Sequence).element(a, Occurs::new(4_000_000_000, None));
        assert!(matches!(group.flatten(&mut grammar).unwrap_err(), Error::LimitExceeded(_)));
        // only the leaves were stored
        assert_eq!(grammar.content_spec_count(), nodes + 2);
    }
}
