//! Schema document traversal
//!
//! The [`Traverser`] walks an `xs:schema` tree and populates one grammar.
//! Named types are traversed on first use; an element whose type is still
//! being traversed (a recursive reference) is left with its defined scope
//! unassigned and filled in once the type is complete.

use std::collections::HashMap;
use std::sync::Arc;

use roxmltree::Node;
use tracing::{trace, warn};

use crate::error::{Error, ParseError, Result};
use crate::grammar::{
    AttributeDecl, AttributeType, ComplexTypeInfo, ContentKind, DefaultKind, ElementDecl,
    ElementDeclIndex, Grammar, Scope,
};
use crate::names::{split_qname, validate_ncname, FullName};
use crate::namespaces::QualifiedName;
use crate::symbols::NameTable;
use crate::validators::datatypes::{builtin, DatatypeValidator, RestrictedDatatype};
use crate::validators::elements::ElementForm;
use crate::validators::groups::{GroupParticle, ModelGroup, ModelType};
use crate::validators::particles::{parse_occurs, Occurs};
use crate::XSD_NAMESPACE;

use super::components::{
    transition, xsd_attrs, ComponentTag, Facet, Restriction, SchemaComponent, Transition,
};

/// Traversal state of a named complex type
enum ComplexSlot<'d, 'input> {
    Unvisited(Node<'d, 'input>),
    InProgress { pending: Vec<ElementDeclIndex> },
    Done(Arc<ComplexTypeInfo>),
    Failed,
}

/// Traversal state of a named simple type
enum SimpleSlot<'d, 'input> {
    Unvisited(Node<'d, 'input>),
    InProgress,
    Done(Arc<dyn DatatypeValidator>),
    Failed,
}

/// A resolved `type` attribute
enum TypeRef {
    AnyType,
    Simple(Arc<dyn DatatypeValidator>),
    Complex(Arc<ComplexTypeInfo>),
    /// Named complex type still being traversed
    Pending(String),
}

/// Per-parse state
pub struct TraversalContext<'d, 'input> {
    /// Target namespace ("" for none)
    pub target_namespace: String,
    /// Form of local elements without a `form` attribute
    pub element_form: ElementForm,
    /// Problems found so far
    pub errors: Vec<ParseError>,
    complex_types: HashMap<String, ComplexSlot<'d, 'input>>,
    simple_types: HashMap<String, SimpleSlot<'d, 'input>>,
}

impl<'d, 'input> TraversalContext<'d, 'input> {
    /// Read the schema-level settings and index the named types
    pub fn new(schema: Node<'d, 'input>) -> Self {
        let mut ctx = Self {
            target_namespace: schema
                .attribute(xsd_attrs::TARGET_NAMESPACE)
                .unwrap_or("")
                .to_string(),
            element_form: ElementForm::Unqualified,
            errors: Vec::new(),
            complex_types: HashMap::new(),
            simple_types: HashMap::new(),
        };

        if let Some(value) = schema.attribute(xsd_attrs::ELEMENT_FORM_DEFAULT) {
            match ElementForm::parse(value) {
                Some(form) => ctx.element_form = form,
                None => ctx.errors.push(
                    ParseError::new(format!("invalid elementFormDefault '{}'", value))
                        .with_component("schema"),
                ),
            }
        }

        for child in schema.children().filter(Node::is_element) {
            let Some(name) = child.attribute(xsd_attrs::NAME) else {
                continue;
            };
            let duplicate = match ComponentTag::of(child) {
                ComponentTag::ComplexType => {
                    ctx.simple_types.contains_key(name)
                        || ctx
                            .complex_types
                            .insert(name.to_string(), ComplexSlot::Unvisited(child))
                            .is_some()
                }
                ComponentTag::SimpleType => {
                    ctx.complex_types.contains_key(name)
                        || ctx
                            .simple_types
                            .insert(name.to_string(), SimpleSlot::Unvisited(child))
                            .is_some()
                }
                _ => false,
            };
            if duplicate {
                ctx.errors.push(
                    ParseError::new(format!("duplicate type definition '{}'", name))
                        .with_component(describe(child)),
                );
            }
        }
        ctx
    }
}

/// Short description of a schema node for error reports
fn describe(node: Node<'_, '_>) -> String {
    let tag = node.tag_name().name();
    match node
        .attribute(xsd_attrs::NAME)
        .or_else(|| node.attribute(xsd_attrs::REF))
    {
        Some(name) => format!("{} '{}'", tag, name),
        None => tag.to_string(),
    }
}

/// Walks one schema document into a grammar
pub struct Traverser<'g, 'd, 'input> {
    grammar: &'g mut Grammar,
    names: &'g mut dyn NameTable,
    ctx: TraversalContext<'d, 'input>,
}

impl<'g, 'd, 'input> Traverser<'g, 'd, 'input> {
    /// Create a traverser writing into `grammar`
    pub fn new(
        grammar: &'g mut Grammar,
        names: &'g mut dyn NameTable,
        ctx: TraversalContext<'d, 'input>,
    ) -> Self {
        Self { grammar, names, ctx }
    }

    /// Hand back the context with the collected errors
    pub fn finish(self) -> TraversalContext<'d, 'input> {
        self.ctx
    }

    /// Traverse every top-level component of the schema
    pub fn schema(&mut self, schema: Node<'d, 'input>) {
        for child in schema.children().filter(Node::is_element) {
            self.visit(ComponentTag::Schema, child, Scope::TopLevel);
        }
    }

    fn record(&mut self, error: Error, node: Node<'d, 'input>) {
        let error = match error {
            Error::Parse(error) => error,
            other => ParseError::new(other.to_string()),
        };
        let error = match error.component {
            Some(_) => error,
            None => error.with_component(describe(node)),
        };
        warn!(component = ?error.component, "{}", error.message);
        self.ctx.errors.push(error);
    }

    /// Dispatch one child component through the transition table
    fn visit(
        &mut self,
        parent: ComponentTag,
        node: Node<'d, 'input>,
        scope: Scope,
    ) -> Option<SchemaComponent> {
        let tag = ComponentTag::of(node);
        match transition(parent, tag) {
            Transition::Skip => return None,
            Transition::Reject => {
                let error = ParseError::new(format!(
                    "unexpected <{}> inside <{}>",
                    node.tag_name().name(),
                    parent
                ));
                self.record(error.into(), node);
                return None;
            }
            Transition::Descend => {}
        }

        let result = match tag {
            ComponentTag::Element if parent == ComponentTag::Schema => {
                self.global_element(node).map(SchemaComponent::Element)
            }
            ComponentTag::Element => self.local_element(node, scope).map(SchemaComponent::Particle),
            ComponentTag::ComplexType if parent == ComponentTag::Schema => self
                .named_complex_type_node(node)
                .map(SchemaComponent::ComplexType),
            ComponentTag::ComplexType => self.complex_type(node, None).map(SchemaComponent::ComplexType),
            ComponentTag::SimpleType if parent == ComponentTag::Schema => self
                .named_simple_type_node(node)
                .map(SchemaComponent::SimpleType),
            ComponentTag::SimpleType => self.simple_type(node, None).map(SchemaComponent::SimpleType),
            ComponentTag::Sequence | ComponentTag::Choice => {
                self.model_group(node, scope).map(SchemaComponent::Group)
            }
            ComponentTag::Attribute => self.attribute(node).map(SchemaComponent::Attribute),
            ComponentTag::Restriction => self.restriction(node).map(SchemaComponent::Restriction),
            ComponentTag::Enumeration => self.facet(node).map(|v| SchemaComponent::Facet(Facet::Enumeration(v))),
            ComponentTag::Pattern => self.facet(node).map(|v| SchemaComponent::Facet(Facet::Pattern(v))),
            ComponentTag::Schema
            | ComponentTag::Annotation
            | ComponentTag::Import
            | ComponentTag::Unsupported => return None,
        };

        match result {
            Ok(component) => Some(component),
            Err(error) => {
                self.record(error, node);
                None
            }
        }
    }

    fn unexpected(&mut self, component: SchemaComponent, node: Node<'d, 'input>) {
        let error = ParseError::new(format!("unexpected {} component", component.kind_name()));
        self.record(error.into(), node);
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Resolve a prefixed name against the in-scope namespaces of `node`
    fn resolve_qname(&self, node: Node<'d, 'input>, qname: &str) -> Result<(String, String)> {
        let (prefix, local) = split_qname(qname.trim());
        validate_ncname(local)?;
        let uri = match prefix {
            Some(prefix) => node.lookup_namespace_uri(Some(prefix)).ok_or_else(|| {
                ParseError::new(format!("unbound namespace prefix '{}' in '{}'", prefix, qname))
            })?,
            None => node.lookup_namespace_uri(None).unwrap_or(""),
        };
        Ok((uri.to_string(), local.to_string()))
    }

    fn intern(&mut self, uri: &str, local: &str) -> QualifiedName {
        QualifiedName::intern(&mut *self.names, uri, local)
    }

    fn target_name(&mut self, local: &str) -> QualifiedName {
        let uri = self.ctx.target_namespace.clone();
        self.intern(&uri, local)
    }

    fn occurs(&mut self, node: Node<'d, 'input>) -> Occurs {
        match parse_occurs(
            node.attribute(xsd_attrs::MIN_OCCURS),
            node.attribute(xsd_attrs::MAX_OCCURS),
        ) {
            Ok(occurs) => occurs,
            Err(error) => {
                self.record(error, node);
                Occurs::once()
            }
        }
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Existing declaration of `name` in `scope`, or a fresh one whose
    /// defined scope is still unassigned
    fn declare_element(&mut self, name: QualifiedName, scope: Scope) -> Result<(ElementDeclIndex, bool)> {
        if let Some(existing) = self.grammar.element_decl_index(&name, scope) {
            return Ok((existing, false));
        }
        let handle = self.grammar.create_element_decl();
        self.grammar
            .set_element_decl(handle, ElementDecl::new(name, scope, ContentKind::Any))?;
        Ok((handle, true))
    }

    fn global_element(&mut self, node: Node<'d, 'input>) -> Result<ElementDeclIndex> {
        let local = node
            .attribute(xsd_attrs::NAME)
            .ok_or_else(|| ParseError::new("global element missing 'name' attribute"))?;
        validate_ncname(local)?;
        let name = self.target_name(local);
        let (handle, fresh) = self.declare_element(name, Scope::TopLevel)?;
        if !fresh {
            return Err(ParseError::new(format!("duplicate global element '{}'", local)).into());
        }

        for attr in [xsd_attrs::SUBSTITUTION_GROUP, xsd_attrs::EQUIV_CLASS] {
            let Some(value) = node.attribute(attr) else {
                continue;
            };
            match self.resolve_qname(node, value) {
                Ok((uri, local)) => {
                    let head = FullName::new(&uri, &local);
                    if attr == xsd_attrs::SUBSTITUTION_GROUP {
                        self.grammar.set_element_substitution_group(handle, head)?;
                    } else {
                        self.grammar.set_element_equiv_class(handle, head)?;
                    }
                }
                Err(error) => self.record(error, node),
            }
        }

        self.element_type(node, handle)?;
        trace!(element = local, handle = handle.index(), "declared global element");
        Ok(handle)
    }

    fn local_element(&mut self, node: Node<'d, 'input>, scope: Scope) -> Result<GroupParticle> {
        let occurs = self.occurs(node);

        if let Some(reference) = node.attribute(xsd_attrs::REF) {
            let (uri, local) = self.resolve_qname(node, reference)?;
            let name = self.intern(&uri, &local);
            if uri != self.ctx.target_namespace {
                let handle = self
                    .grammar
                    .add_element_decl(name, scope, Scope::TopLevel, ContentKind::Any);
                self.grammar
                    .set_element_from_another_schema_uri(Some(handle), uri)?;
            }
            return Ok(GroupParticle::Element(name, occurs));
        }

        let local = node
            .attribute(xsd_attrs::NAME)
            .ok_or_else(|| ParseError::new("local element needs a 'name' or 'ref' attribute"))?;
        validate_ncname(local)?;
        let form = match node.attribute(xsd_attrs::FORM) {
            Some(value) => ElementForm::parse(value)
                .ok_or_else(|| ParseError::new(format!("invalid form '{}'", value)))?,
            None => self.ctx.element_form,
        };
        let name = match form {
            ElementForm::Qualified => self.target_name(local),
            ElementForm::Unqualified => self.intern("", local),
        };

        let (handle, fresh) = self.declare_element(name, scope)?;
        if fresh {
            self.element_type(node, handle)?;
        }
        Ok(GroupParticle::Element(name, occurs))
    }

    /// Give an element its content from the `type` attribute or an inline type
    fn element_type(&mut self, node: Node<'d, 'input>, handle: ElementDeclIndex) -> Result<()> {
        let type_ref = match node.attribute(xsd_attrs::TYPE) {
            Some(value) => self.resolve_type(node, value)?,
            None => {
                let mut type_ref = TypeRef::AnyType;
                for child in node.children().filter(Node::is_element) {
                    match self.visit(ComponentTag::Element, child, Scope::TopLevel) {
                        Some(SchemaComponent::ComplexType(info)) => type_ref = TypeRef::Complex(info),
                        Some(SchemaComponent::SimpleType(datatype)) => type_ref = TypeRef::Simple(datatype),
                        Some(other) => self.unexpected(other, child),
                        None => {}
                    }
                }
                type_ref
            }
        };
        self.apply_type(handle, type_ref)
    }

    fn apply_type(&mut self, handle: ElementDeclIndex, type_ref: TypeRef) -> Result<()> {
        match type_ref {
            TypeRef::AnyType => {
                self.grammar.set_element_content(handle, ContentKind::Any)?;
                self.grammar.set_element_defined_scope(Some(handle), Scope::TopLevel)
            }
            TypeRef::Simple(datatype) => {
                self.grammar.set_element_content(handle, ContentKind::Simple(datatype))?;
                self.grammar.set_element_defined_scope(Some(handle), Scope::TopLevel)
            }
            TypeRef::Complex(info) => self.grammar.set_element_complex_type_info(Some(handle), info),
            TypeRef::Pending(type_name) => {
                if let Some(ComplexSlot::InProgress { pending }) = self.ctx.complex_types.get_mut(&type_name) {
                    trace!(handle = handle.index(), type_name = %type_name, "deferred complex type");
                    pending.push(handle);
                }
                Ok(())
            }
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn resolve_type(&mut self, node: Node<'d, 'input>, value: &str) -> Result<TypeRef> {
        let (uri, local) = self.resolve_qname(node, value)?;
        if uri == XSD_NAMESPACE {
            if local == "anyType" {
                return Ok(TypeRef::AnyType);
            }
            return builtin(&local)
                .map(TypeRef::Simple)
                .ok_or_else(|| ParseError::new(format!("unsupported built-in type 'xs:{}'", local)).into());
        }
        if uri != self.ctx.target_namespace {
            return Err(ParseError::new(format!(
                "type '{}' belongs to namespace '{}' which is not ingested",
                local, uri
            ))
            .into());
        }
        if self.ctx.complex_types.contains_key(&local) {
            return Ok(match self.named_complex_type(&local)? {
                Some(info) => TypeRef::Complex(info),
                None => TypeRef::Pending(local),
            });
        }
        if self.ctx.simple_types.contains_key(&local) {
            return self.named_simple_type(&local).map(TypeRef::Simple);
        }
        Err(ParseError::new(format!("unknown type '{}'", value)).into())
    }

    fn named_complex_type_node(&mut self, node: Node<'d, 'input>) -> Result<Arc<ComplexTypeInfo>> {
        let name = node
            .attribute(xsd_attrs::NAME)
            .ok_or_else(|| ParseError::new("top-level complex type needs a 'name' attribute"))?;
        self.named_complex_type(name)?.ok_or_else(|| {
            Error::Internal(format!("complex type '{}' still in progress at top level", name))
        })
    }

    /// Traverse a named complex type on first use; `None` while it is being
    /// traversed
    fn named_complex_type(&mut self, local: &str) -> Result<Option<Arc<ComplexTypeInfo>>> {
        let node = match self.ctx.complex_types.get(local) {
            Some(ComplexSlot::Done(info)) => return Ok(Some(Arc::clone(info))),
            Some(ComplexSlot::InProgress { .. }) => return Ok(None),
            Some(ComplexSlot::Failed) => {
                return Err(ParseError::new(format!("complex type '{}' is invalid", local)).into())
            }
            Some(ComplexSlot::Unvisited(node)) => *node,
            None => return Err(ParseError::new(format!("unknown complex type '{}'", local)).into()),
        };

        self.ctx
            .complex_types
            .insert(local.to_string(), ComplexSlot::InProgress { pending: Vec::new() });
        let type_name = self.target_name(local);
        let result = self.complex_type(node, Some(type_name));
        let previous = match &result {
            Ok(info) => self
                .ctx
                .complex_types
                .insert(local.to_string(), ComplexSlot::Done(Arc::clone(info))),
            Err(_) => self.ctx.complex_types.insert(local.to_string(), ComplexSlot::Failed),
        };
        let info = result?;

        if let Some(ComplexSlot::InProgress { pending }) = previous {
            for handle in pending {
                self.grammar
                    .set_element_complex_type_info(Some(handle), Arc::clone(&info))?;
            }
        }
        Ok(Some(info))
    }

    fn complex_type(
        &mut self,
        node: Node<'d, 'input>,
        name: Option<QualifiedName>,
    ) -> Result<Arc<ComplexTypeInfo>> {
        let scope = self.grammar.allocate_scope();
        let mixed = match node.attribute(xsd_attrs::MIXED) {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ParseError::new(format!("invalid 'mixed' value '{}'", other)).into())
            }
        };

        let mut group: Option<ModelGroup> = None;
        let mut attributes = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match self.visit(ComponentTag::ComplexType, child, scope) {
                Some(SchemaComponent::Group(g)) if group.is_none() => group = Some(g),
                Some(SchemaComponent::Group(_)) => {
                    let error = ParseError::new("complex type has more than one model group");
                    self.record(error.into(), child);
                }
                Some(SchemaComponent::Attribute(attribute)) => attributes.push(attribute),
                Some(other) => self.unexpected(other, child),
                None => {}
            }
        }

        let root = match group {
            Some(group) => group.flatten(self.grammar)?,
            None => None,
        };
        let content = match (mixed, root) {
            (true, root) => ContentKind::Mixed(root),
            (false, Some(root)) => ContentKind::Children(root),
            (false, None) => ContentKind::Empty,
        };
        let mut info = ComplexTypeInfo::new(name, scope, content);
        info.attributes = attributes;
        Ok(Arc::new(info))
    }

    fn model_group(&mut self, node: Node<'d, 'input>, scope: Scope) -> Result<ModelGroup> {
        let tag = ComponentTag::of(node);
        let model = ModelType::from_tag(node.tag_name().name())
            .ok_or_else(|| Error::Internal(format!("<{}> is not a model group", tag)))?;
        let occurs = self.occurs(node);
        let mut group = ModelGroup::new(model).with_occurs(occurs);
        for child in node.children().filter(Node::is_element) {
            match self.visit(tag, child, scope) {
                Some(SchemaComponent::Particle(particle)) => group.particles.push(particle),
                Some(SchemaComponent::Group(nested)) => group = group.group(nested),
                Some(other) => self.unexpected(other, child),
                None => {}
            }
        }
        Ok(group)
    }

    fn named_simple_type_node(&mut self, node: Node<'d, 'input>) -> Result<Arc<dyn DatatypeValidator>> {
        let name = node
            .attribute(xsd_attrs::NAME)
            .ok_or_else(|| ParseError::new("top-level simple type needs a 'name' attribute"))?;
        self.named_simple_type(name)
    }

    fn named_simple_type(&mut self, local: &str) -> Result<Arc<dyn DatatypeValidator>> {
        let node = match self.ctx.simple_types.get(local) {
            Some(SimpleSlot::Done(datatype)) => return Ok(Arc::clone(datatype)),
            Some(SimpleSlot::InProgress) => {
                return Err(ParseError::new(format!("simple type '{}' is derived from itself", local)).into())
            }
            Some(SimpleSlot::Failed) => {
                return Err(ParseError::new(format!("simple type '{}' is invalid", local)).into())
            }
            Some(SimpleSlot::Unvisited(node)) => *node,
            None => return Err(ParseError::new(format!("unknown simple type '{}'", local)).into()),
        };

        self.ctx.simple_types.insert(local.to_string(), SimpleSlot::InProgress);
        let result = self.simple_type(node, Some(local));
        let slot = match &result {
            Ok(datatype) => SimpleSlot::Done(Arc::clone(datatype)),
            Err(_) => SimpleSlot::Failed,
        };
        self.ctx.simple_types.insert(local.to_string(), slot);
        result
    }

    fn simple_type(&mut self, node: Node<'d, 'input>, name: Option<&str>) -> Result<Arc<dyn DatatypeValidator>> {
        let mut restriction = None;
        for child in node.children().filter(Node::is_element) {
            match self.visit(ComponentTag::SimpleType, child, Scope::TopLevel) {
                Some(SchemaComponent::Restriction(r)) => restriction = Some(r),
                Some(other) => self.unexpected(other, child),
                None => {}
            }
        }
        let restriction =
            restriction.ok_or_else(|| ParseError::new("simple type needs a valid restriction"))?;

        let type_name = name.unwrap_or(restriction.base.name()).to_string();
        let mut datatype = RestrictedDatatype::new(type_name, restriction.base);
        for facet in restriction.facets {
            datatype = match facet {
                Facet::Enumeration(value) => datatype.with_enumeration(value),
                Facet::Pattern(pattern) => datatype.with_pattern(&pattern)?,
            };
        }
        Ok(Arc::new(datatype))
    }

    fn restriction(&mut self, node: Node<'d, 'input>) -> Result<Restriction> {
        let base = node
            .attribute(xsd_attrs::BASE)
            .ok_or_else(|| ParseError::new("restriction needs a 'base' attribute"))?;
        let base = match self.resolve_type(node, base)? {
            TypeRef::Simple(datatype) => datatype,
            _ => return Err(ParseError::new(format!("restriction base '{}' is not a simple type", base)).into()),
        };
        let mut facets = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match self.visit(ComponentTag::Restriction, child, Scope::TopLevel) {
                Some(SchemaComponent::Facet(facet)) => facets.push(facet),
                Some(other) => self.unexpected(other, child),
                None => {}
            }
        }
        Ok(Restriction { base, facets })
    }

    fn facet(&mut self, node: Node<'d, 'input>) -> Result<String> {
        node.attribute(xsd_attrs::VALUE)
            .map(str::to_string)
            .ok_or_else(|| ParseError::new("facet needs a 'value' attribute").into())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn attribute(&mut self, node: Node<'d, 'input>) -> Result<AttributeDecl> {
        let local = node
            .attribute(xsd_attrs::NAME)
            .ok_or_else(|| ParseError::new("attribute needs a 'name' attribute"))?;
        validate_ncname(local)?;
        let name = self.intern("", local);
        let mut decl = AttributeDecl::new(name, AttributeType::CData);

        if let Some(value) = node.attribute(xsd_attrs::TYPE) {
            let (uri, type_local) = self.resolve_qname(node, value)?;
            let special = match type_local.as_str() {
                "ID" => Some((AttributeType::Id, "NCName")),
                "IDREF" => Some((AttributeType::IdRef, "NCName")),
                "NMTOKEN" => Some((AttributeType::NmToken, "token")),
                _ => None,
            };
            match special.filter(|_| uri == XSD_NAMESPACE) {
                Some((attr_type, base)) => {
                    decl.attr_type = attr_type;
                    decl.datatype = builtin(base);
                }
                None => match self.resolve_type(node, value)? {
                    TypeRef::Simple(datatype) => decl = decl.with_datatype(datatype),
                    TypeRef::AnyType => {}
                    TypeRef::Complex(_) | TypeRef::Pending(_) => {
                        return Err(ParseError::new(format!("attribute type '{}' is not simple", value)).into())
                    }
                },
            }
        } else {
            for child in node.children().filter(Node::is_element) {
                match self.visit(ComponentTag::Attribute, child, Scope::TopLevel) {
                    Some(SchemaComponent::SimpleType(datatype)) => decl = decl.with_datatype(datatype),
                    Some(other) => self.unexpected(other, child),
                    None => {}
                }
            }
        }
        if decl.datatype.is_some() && decl.attr_type == AttributeType::CData {
            decl.attr_type = AttributeType::Simple;
        }

        let use_ = node.attribute(xsd_attrs::USE).unwrap_or("optional");
        let default = node.attribute(xsd_attrs::DEFAULT);
        let fixed = node.attribute(xsd_attrs::FIXED);
        let (kind, value) = match (use_, default, fixed) {
            (_, Some(_), Some(_)) => {
                return Err(ParseError::new("'default' and 'fixed' are mutually exclusive").into())
            }
            ("required", Some(_), _) => {
                return Err(ParseError::new("a required attribute cannot have a default").into())
            }
            ("required", None, Some(fixed)) => (DefaultKind::RequiredFixed, Some(fixed)),
            ("required", None, None) => (DefaultKind::Required, None),
            ("optional", None, Some(fixed)) => (DefaultKind::Fixed, Some(fixed)),
            ("optional", Some(default), None) => (DefaultKind::Default, Some(default)),
            ("optional", None, None) => (DefaultKind::Implied, None),
            (other, _, _) => {
                return Err(ParseError::new(format!("unsupported attribute use '{}'", other)).into())
            }
        };
        if let (Some(datatype), Some(value)) = (&decl.datatype, value) {
            datatype.validate(value).map_err(Error::from)?;
        }
        Ok(decl.with_default(kind, value.map(str::to_string)))
    }
}
