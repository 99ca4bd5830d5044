//! Declaration records held by the grammar store
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#Element_Declarations

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::names::FullName;
use crate::namespaces::QualifiedName;
use crate::validators::datatypes::DatatypeValidator;

use super::handles::{AttributeDeclIndex, ContentSpecIndex};

/// Scope an element declaration lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Global declarations (raw value -1)
    #[default]
    TopLevel,
    /// Declarations local to a complex type
    Local(u32),
}

impl Scope {
    /// Convert a raw scope value; -1 is top-level, anything below is malformed
    pub fn from_raw(raw: i64) -> Result<Self> {
        match raw {
            -1 => Ok(Scope::TopLevel),
            0.. => u32::try_from(raw)
                .map(Scope::Local)
                .map_err(|_| Error::InvalidScope(raw)),
            _ => Err(Error::InvalidScope(raw)),
        }
    }

    /// Raw integer form
    pub fn to_raw(self) -> i64 {
        match self {
            Scope::TopLevel => -1,
            Scope::Local(scope) => i64::from(scope),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::TopLevel => write!(f, "top-level"),
            Scope::Local(scope) => write!(f, "local scope {}", scope),
        }
    }
}

/// One node of a content model
///
/// Leaves carry an element name; the unary operators carry their single
/// operand and the binary operators their two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSpecNode {
    /// A single required element
    Leaf(QualifiedName),
    /// `child?`
    ZeroOrOne(ContentSpecIndex),
    /// `child*`
    ZeroOrMore(ContentSpecIndex),
    /// `child+`
    OneOrMore(ContentSpecIndex),
    /// `first | second`
    Choice(ContentSpecIndex, ContentSpecIndex),
    /// `first , second`
    Sequence(ContentSpecIndex, ContentSpecIndex),
}

impl ContentSpecNode {
    /// Operand handles of a composite node
    pub fn operands(&self) -> impl Iterator<Item = ContentSpecIndex> {
        let (first, second) = match *self {
            ContentSpecNode::Leaf(_) => (None, None),
            ContentSpecNode::ZeroOrOne(child)
            | ContentSpecNode::ZeroOrMore(child)
            | ContentSpecNode::OneOrMore(child) => (Some(child), None),
            ContentSpecNode::Choice(first, second) | ContentSpecNode::Sequence(first, second) => {
                (Some(first), Some(second))
            }
        };
        first.into_iter().chain(second)
    }

    /// Operator name for messages
    pub fn operator_name(&self) -> &'static str {
        match self {
            ContentSpecNode::Leaf(_) => "leaf",
            ContentSpecNode::ZeroOrOne(_) => "zero-or-one",
            ContentSpecNode::ZeroOrMore(_) => "zero-or-more",
            ContentSpecNode::OneOrMore(_) => "one-or-more",
            ContentSpecNode::Choice(..) => "choice",
            ContentSpecNode::Sequence(..) => "sequence",
        }
    }
}

/// Content-model kind of an element declaration
#[derive(Debug, Clone)]
pub enum ContentKind {
    /// No children and no character data
    Empty,
    /// Anything goes
    Any,
    /// Character data interleaved with elements named in the model
    Mixed(Option<ContentSpecIndex>),
    /// Element-only content described by a content-spec tree
    Children(ContentSpecIndex),
    /// Character data checked by a primitive datatype validator
    Simple(Arc<dyn DatatypeValidator>),
}

impl ContentKind {
    /// Root of the content-spec tree, if structured
    pub fn content_spec(&self) -> Option<ContentSpecIndex> {
        match self {
            ContentKind::Children(root) => Some(*root),
            ContentKind::Mixed(root) => *root,
            _ => None,
        }
    }

    /// Short name for summaries
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentKind::Empty => "empty",
            ContentKind::Any => "any",
            ContentKind::Mixed(_) => "mixed",
            ContentKind::Children(_) => "children",
            ContentKind::Simple(_) => "simple",
        }
    }
}

/// Richer metadata of a complex type, shared by the elements using it
#[derive(Debug, Clone)]
pub struct ComplexTypeInfo {
    /// Type name (None for anonymous types)
    pub name: Option<QualifiedName>,
    /// Scope introduced for the type's local declarations
    pub scope: Scope,
    /// Content model of the type
    pub content: ContentKind,
    /// Attribute declarations copied onto each element of this type
    pub attributes: Vec<AttributeDecl>,
}

impl ComplexTypeInfo {
    /// Create type info with no attributes
    pub fn new(name: Option<QualifiedName>, scope: Scope, content: ContentKind) -> Self {
        Self {
            name,
            scope,
            content,
            attributes: Vec::new(),
        }
    }

    /// Whether character data may appear between children
    pub fn is_mixed(&self) -> bool {
        matches!(self.content, ContentKind::Mixed(_))
    }
}

/// Which head-element link a substitution query follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `substitutionGroup` naming
    SubstitutionGroup,
    /// Legacy `equivClass` naming
    EquivClass,
}

/// Element declaration
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// Element name
    pub name: QualifiedName,
    /// Scope the element is declared in
    pub enclosing_scope: Scope,
    /// Scope this element introduces; None until assigned
    pub defined_scope: Option<Scope>,
    /// Content model
    pub content: ContentKind,
    /// Namespace of the schema the element was imported from
    pub from_another_schema: Option<String>,
    /// Complex type metadata
    pub complex_type: Option<Arc<ComplexTypeInfo>>,
    /// Head of the substitution group this element belongs to
    pub substitution_group: Option<FullName>,
    /// Head of the legacy equivalence class this element belongs to
    pub equiv_class: Option<FullName>,
    pub(crate) first_attribute: Option<AttributeDeclIndex>,
    pub(crate) last_attribute: Option<AttributeDeclIndex>,
}

impl ElementDecl {
    /// Create a declaration with no attributes and no links
    pub fn new(name: QualifiedName, enclosing_scope: Scope, content: ContentKind) -> Self {
        Self {
            name,
            enclosing_scope,
            defined_scope: None,
            content,
            from_another_schema: None,
            complex_type: None,
            substitution_group: None,
            equiv_class: None,
            first_attribute: None,
            last_attribute: None,
        }
    }

    /// Set the substitution group head
    pub fn with_substitution_group(mut self, head: FullName) -> Self {
        self.substitution_group = Some(head);
        self
    }

    /// Set the equivalence class head
    pub fn with_equiv_class(mut self, head: FullName) -> Self {
        self.equiv_class = Some(head);
        self
    }

    /// Head-element link of the requested kind
    pub fn link(&self, kind: LinkKind) -> Option<&FullName> {
        match kind {
            LinkKind::SubstitutionGroup => self.substitution_group.as_ref(),
            LinkKind::EquivClass => self.equiv_class.as_ref(),
        }
    }

    /// First entry of the attribute list
    pub fn attribute_list_head(&self) -> Option<AttributeDeclIndex> {
        self.first_attribute
    }
}

/// Declared attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Character data
    CData,
    /// ID
    Id,
    /// IDREF
    IdRef,
    /// NMTOKEN
    NmToken,
    /// One of an enumerated set of values
    Enumeration,
    /// Checked by a datatype validator
    Simple,
}

/// Default-value kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultKind {
    /// Optional, no default
    #[default]
    Implied,
    /// Must be present
    Required,
    /// Defaulted when absent
    Default,
    /// Must equal the given value when present
    Fixed,
    /// Must be present and equal the given value
    RequiredFixed,
}

impl DefaultKind {
    /// Whether the attribute must be present
    pub fn is_required(self) -> bool {
        matches!(self, Self::Required | Self::RequiredFixed)
    }

    /// Whether a present value must equal the declared one
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed | Self::RequiredFixed)
    }
}

/// Attribute declaration
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Attribute name
    pub name: QualifiedName,
    /// Declared type
    pub attr_type: AttributeType,
    /// Allowed values for enumerated attributes
    pub enumeration: Option<Vec<String>>,
    /// Default-value kind
    pub default_kind: DefaultKind,
    /// Default or fixed value
    pub default_value: Option<String>,
    /// Datatype validator for the value
    pub datatype: Option<Arc<dyn DatatypeValidator>>,
    pub(crate) next: Option<AttributeDeclIndex>,
}

impl AttributeDecl {
    /// Create an implied attribute declaration
    pub fn new(name: QualifiedName, attr_type: AttributeType) -> Self {
        Self {
            name,
            attr_type,
            enumeration: None,
            default_kind: DefaultKind::Implied,
            default_value: None,
            datatype: None,
            next: None,
        }
    }

    /// Set the default kind and value
    pub fn with_default(mut self, kind: DefaultKind, value: Option<String>) -> Self {
        self.default_kind = kind;
        self.default_value = value;
        self
    }

    /// Set the enumerated values
    pub fn with_enumeration(mut self, values: Vec<String>) -> Self {
        self.enumeration = Some(values);
        self
    }

    /// Set the datatype validator
    pub fn with_datatype(mut self, datatype: Arc<dyn DatatypeValidator>) -> Self {
        self.datatype = Some(datatype);
        self
    }

    /// Next attribute in the owner's list
    pub fn next(&self) -> Option<AttributeDeclIndex> {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_raw() {
        assert_eq!(Scope::from_raw(-1).unwrap(), Scope::TopLevel);
        assert_eq!(Scope::from_raw(4).unwrap(), Scope::Local(4));
        assert!(matches!(Scope::from_raw(-2), Err(Error::InvalidScope(-2))));
        assert_eq!(Scope::Local(9).to_raw(), 9);
    }

    #[test]
    fn test_operands() {
        let a = ContentSpecIndex::from(1);
        let b = ContentSpecIndex::from(2);
        let seq: Vec<_> = ContentSpecNode::Sequence(a, b).operands().collect();
        assert_eq!(seq, vec![a, b]);
        let star: Vec<_> = ContentSpecNode::ZeroOrMore(a).operands().collect();
        assert_eq!(star, vec![a]);
    }
}
