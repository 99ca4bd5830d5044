//! Schema components and the traversal transition table
//!
//! Every schema element the traversal visits is classified into a
//! [`ComponentTag`]; whether it may appear under its parent is decided by a
//! static table, and the handler for it returns a typed
//! [`SchemaComponent`] the parent consumes.

use std::fmt;
use std::sync::Arc;

use roxmltree::Node;

use crate::grammar::{AttributeDecl, ComplexTypeInfo, ElementDeclIndex};
use crate::validators::datatypes::DatatypeValidator;
use crate::validators::groups::{GroupParticle, ModelGroup};
use crate::XSD_NAMESPACE;

/// XSD element local names
pub(crate) mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const RESTRICTION: &str = "restriction";
    pub const ENUMERATION: &str = "enumeration";
    pub const PATTERN: &str = "pattern";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
}

/// XSD attribute names
pub(crate) mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const FORM: &str = "form";
    pub const USE: &str = "use";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const EQUIV_CLASS: &str = "equivClass";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

/// Kind of schema element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentTag {
    /// `xs:schema`
    Schema,
    /// `xs:element`
    Element,
    /// `xs:complexType`
    ComplexType,
    /// `xs:simpleType`
    SimpleType,
    /// `xs:sequence`
    Sequence,
    /// `xs:choice`
    Choice,
    /// `xs:attribute`
    Attribute,
    /// `xs:restriction`
    Restriction,
    /// `xs:enumeration`
    Enumeration,
    /// `xs:pattern`
    Pattern,
    /// `xs:annotation`
    Annotation,
    /// `xs:import`
    Import,
    /// Anything else, including elements outside the XSD namespace
    Unsupported,
}

impl ComponentTag {
    /// Classify a schema node
    pub fn of(node: Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        if tag.namespace() != Some(XSD_NAMESPACE) {
            return ComponentTag::Unsupported;
        }
        match tag.name() {
            xsd_elements::SCHEMA => ComponentTag::Schema,
            xsd_elements::ELEMENT => ComponentTag::Element,
            xsd_elements::COMPLEX_TYPE => ComponentTag::ComplexType,
            xsd_elements::SIMPLE_TYPE => ComponentTag::SimpleType,
            xsd_elements::SEQUENCE => ComponentTag::Sequence,
            xsd_elements::CHOICE => ComponentTag::Choice,
            xsd_elements::ATTRIBUTE => ComponentTag::Attribute,
            xsd_elements::RESTRICTION => ComponentTag::Restriction,
            xsd_elements::ENUMERATION => ComponentTag::Enumeration,
            xsd_elements::PATTERN => ComponentTag::Pattern,
            xsd_elements::ANNOTATION => ComponentTag::Annotation,
            xsd_elements::IMPORT => ComponentTag::Import,
            _ => ComponentTag::Unsupported,
        }
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentTag::Schema => xsd_elements::SCHEMA,
            ComponentTag::Element => xsd_elements::ELEMENT,
            ComponentTag::ComplexType => xsd_elements::COMPLEX_TYPE,
            ComponentTag::SimpleType => xsd_elements::SIMPLE_TYPE,
            ComponentTag::Sequence => xsd_elements::SEQUENCE,
            ComponentTag::Choice => xsd_elements::CHOICE,
            ComponentTag::Attribute => xsd_elements::ATTRIBUTE,
            ComponentTag::Restriction => xsd_elements::RESTRICTION,
            ComponentTag::Enumeration => xsd_elements::ENUMERATION,
            ComponentTag::Pattern => xsd_elements::PATTERN,
            ComponentTag::Annotation => xsd_elements::ANNOTATION,
            ComponentTag::Import => xsd_elements::IMPORT,
            ComponentTag::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// What to do with a child component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Traverse it
    Descend,
    /// Ignore it silently
    Skip,
    /// Record an error and ignore it
    Reject,
}

/// Children each component may contain
const TRANSITIONS: &[(ComponentTag, &[ComponentTag])] = &[
    (
        ComponentTag::Schema,
        &[ComponentTag::Element, ComponentTag::ComplexType, ComponentTag::SimpleType],
    ),
    (ComponentTag::Element, &[ComponentTag::ComplexType, ComponentTag::SimpleType]),
    (
        ComponentTag::ComplexType,
        &[ComponentTag::Sequence, ComponentTag::Choice, ComponentTag::Attribute],
    ),
    (
        ComponentTag::Sequence,
        &[ComponentTag::Element, ComponentTag::Sequence, ComponentTag::Choice],
    ),
    (
        ComponentTag::Choice,
        &[ComponentTag::Element, ComponentTag::Sequence, ComponentTag::Choice],
    ),
    (ComponentTag::Attribute, &[ComponentTag::SimpleType]),
    (ComponentTag::SimpleType, &[ComponentTag::Restriction]),
    (
        ComponentTag::Restriction,
        &[ComponentTag::Enumeration, ComponentTag::Pattern],
    ),
];

/// Look up the transition from `parent` into `child`
pub fn transition(parent: ComponentTag, child: ComponentTag) -> Transition {
    match child {
        ComponentTag::Annotation => return Transition::Skip,
        // imported grammars are ingested separately
        ComponentTag::Import if parent == ComponentTag::Schema => return Transition::Skip,
        _ => {}
    }
    let allowed = TRANSITIONS
        .iter()
        .find(|(tag, _)| *tag == parent)
        .is_some_and(|(_, children)| children.contains(&child));
    if allowed {
        Transition::Descend
    } else {
        Transition::Reject
    }
}

/// A restriction facet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet {
    /// Allowed value
    Enumeration(String),
    /// Regular expression the value must match
    Pattern(String),
}

/// Base type plus facets of an `xs:restriction`
#[derive(Debug, Clone)]
pub struct Restriction {
    /// Base datatype
    pub base: Arc<dyn DatatypeValidator>,
    /// Facets in document order
    pub facets: Vec<Facet>,
}

/// Typed result of traversing one component
#[derive(Debug, Clone)]
pub enum SchemaComponent {
    /// A declared global element
    Element(ElementDeclIndex),
    /// A local element or reference inside a model group
    Particle(GroupParticle),
    /// A nested model group
    Group(ModelGroup),
    /// A complex type definition
    ComplexType(Arc<ComplexTypeInfo>),
    /// A simple type definition
    SimpleType(Arc<dyn DatatypeValidator>),
    /// A simple type restriction
    Restriction(Restriction),
    /// An attribute declaration
    Attribute(AttributeDecl),
    /// A restriction facet
    Facet(Facet),
}

impl SchemaComponent {
    /// Component kind for messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaComponent::Element(_) => "element",
            SchemaComponent::Particle(_) => "particle",
            SchemaComponent::Group(_) => "model group",
            SchemaComponent::ComplexType(_) => "complex type",
            SchemaComponent::SimpleType(_) => "simple type",
            SchemaComponent::Restriction(_) => "restriction",
            SchemaComponent::Attribute(_) => "attribute",
            SchemaComponent::Facet(_) => "facet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_tag() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:o="urn:o">
            <xs:element name="a"/><o:thing/><xs:notation name="n"/></xs:schema>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert_eq!(ComponentTag::of(root), ComponentTag::Schema);
        let tags: Vec<_> = root.children().filter(|n| n.is_element()).map(ComponentTag::of).collect();
        assert_eq!(
            tags,
            vec![ComponentTag::Element, ComponentTag::Unsupported, ComponentTag::Unsupported]
        );
    }

    #[test]
    fn test_transition_table() {
        use ComponentTag::*;
        assert_eq!(transition(Schema, Element), Transition::Descend);
        assert_eq!(transition(Sequence, Choice), Transition::Descend);
        assert_eq!(transition(Element, Annotation), Transition::Skip);
        assert_eq!(transition(Schema, Import), Transition::Skip);
        assert_eq!(transition(Sequence, Attribute), Transition::Reject);
        assert_eq!(transition(Element, Import), Transition::Reject);
        assert_eq!(transition(Restriction, Unsupported), Transition::Reject);
    }
}
