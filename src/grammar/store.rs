//! The grammar store
//!
//! A [`Grammar`] owns every element, attribute and content-spec declaration
//! of one namespace. Declarations are appended during ingestion and addressed
//! by store-issued handles afterwards; only the deferred fill operations
//! (`set_element_*`) mutate a declaration after it has been written.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, HandleKind, Result};
use crate::limits::Limits;
use crate::names::FullName;
use crate::namespaces::QualifiedName;
use crate::symbols::Symbol;

use super::chunked::ChunkedTable;
use super::decls::{
    AttributeDecl, ComplexTypeInfo, ContentKind, ContentSpecNode, ElementDecl, Scope,
};
use super::handles::{AttributeDeclIndex, ContentSpecIndex, ElementDeclIndex};

/// Where a grammar's declarations came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrammarKind {
    /// Declarations ingested from a schema document
    #[default]
    Schema,
    /// Declarations ingested from a DTD; no substitution links
    Dtd,
}

/// Declaration store for one namespace
#[derive(Debug)]
pub struct Grammar {
    kind: GrammarKind,
    target_namespace: Option<Symbol>,
    limits: Limits,
    elements: ChunkedTable<ElementDecl>,
    attributes: ChunkedTable<AttributeDecl>,
    content_specs: ChunkedTable<ContentSpecNode>,
    element_index: HashMap<(QualifiedName, Scope), ElementDeclIndex>,
    next_scope: u32,
}

impl Grammar {
    /// Create an empty schema grammar for a target namespace
    pub fn new(target_namespace: Option<Symbol>) -> Self {
        Self::with_limits(GrammarKind::Schema, target_namespace, Limits::default())
    }

    /// Create an empty grammar with explicit kind and limits
    pub fn with_limits(kind: GrammarKind, target_namespace: Option<Symbol>, limits: Limits) -> Self {
        let shift = limits.chunk_shift;
        Self {
            kind,
            target_namespace,
            limits,
            elements: ChunkedTable::new(shift),
            attributes: ChunkedTable::new(shift),
            content_specs: ChunkedTable::new(shift),
            element_index: HashMap::new(),
            next_scope: 0,
        }
    }

    /// Grammar kind
    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    /// Target namespace
    pub fn target_namespace(&self) -> Option<Symbol> {
        self.target_namespace
    }

    /// Limits this grammar was created with
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Allocate a fresh local scope
    pub fn allocate_scope(&mut self) -> Scope {
        let scope = Scope::Local(self.next_scope);
        self.next_scope += 1;
        scope
    }

    // =========================================================================
    // Element declarations
    // =========================================================================

    /// Reserve the next element handle
    pub fn create_element_decl(&mut self) -> ElementDeclIndex {
        ElementDeclIndex::from(self.elements.reserve())
    }

    /// Overwrite a reserved element declaration; its name and scope must not
    /// belong to another handle
    pub fn set_element_decl(&mut self, handle: ElementDeclIndex, decl: ElementDecl) -> Result<()> {
        let key = (decl.name, decl.enclosing_scope);
        if let Some(&existing) = self.element_index.get(&key) {
            if existing != handle {
                return Err(Error::DuplicateDecl {
                    existing: existing.index() as i64,
                    handle: handle.index() as i64,
                });
            }
        }
        if let Some(old) = self.elements.get(handle.index()) {
            let old_key = (old.name, old.enclosing_scope);
            if old_key != key && self.element_index.get(&old_key) == Some(&handle) {
                self.element_index.remove(&old_key);
            }
        }
        if !self.elements.set(handle.index(), decl) {
            return Err(Error::out_of_range(HandleKind::Element, handle.index()));
        }
        self.element_index.insert(key, handle);
        Ok(())
    }

    /// Read an element declaration
    pub fn element_decl(&self, handle: ElementDeclIndex) -> Result<&ElementDecl> {
        self.elements
            .get(handle.index())
            .ok_or_else(|| Error::out_of_range(HandleKind::Element, handle.index()))
    }

    fn element_decl_mut(&mut self, handle: ElementDeclIndex) -> Result<&mut ElementDecl> {
        self.elements
            .get_mut(handle.index())
            .ok_or_else(|| Error::out_of_range(HandleKind::Element, handle.index()))
    }

    /// Add an element declaration unless one with the same name already
    /// lives in `enclosing_scope`, in which case its handle is returned
    /// unchanged.
    pub fn add_element_decl(
        &mut self,
        name: QualifiedName,
        enclosing_scope: Scope,
        scope_defined: Scope,
        content: ContentKind,
    ) -> ElementDeclIndex {
        if let Some(existing) = self.element_decl_index(&name, enclosing_scope) {
            return existing;
        }
        let mut decl = ElementDecl::new(name, enclosing_scope, content);
        decl.defined_scope = Some(scope_defined);
        let handle = ElementDeclIndex::from(self.elements.push(decl));
        self.element_index.insert((name, enclosing_scope), handle);
        trace!(handle = handle.index(), scope = %enclosing_scope, "added element declaration");
        handle
    }

    /// Look up an element by name and scope
    pub fn element_decl_index(&self, name: &QualifiedName, scope: Scope) -> Option<ElementDeclIndex> {
        self.element_index.get(&(*name, scope)).copied()
    }

    /// Look up an element of this grammar's namespace by local name and scope
    pub fn element_decl_index_local(&self, local: Symbol, scope: Scope) -> Option<ElementDeclIndex> {
        self.element_decl_index(&QualifiedName::new(self.target_namespace, local), scope)
    }

    /// Record the scope an element introduces; `None` handle is a no-op
    pub fn set_element_defined_scope(
        &mut self,
        handle: Option<ElementDeclIndex>,
        scope: Scope,
    ) -> Result<()> {
        let Some(handle) = handle else {
            return Ok(());
        };
        self.element_decl_mut(handle)?.defined_scope = Some(scope);
        trace!(handle = handle.index(), scope = %scope, "filled defined scope");
        Ok(())
    }

    /// Record the namespace an imported element was declared in; `None` handle is a no-op
    pub fn set_element_from_another_schema_uri(
        &mut self,
        handle: Option<ElementDeclIndex>,
        uri: impl Into<String>,
    ) -> Result<()> {
        let Some(handle) = handle else {
            return Ok(());
        };
        self.element_decl_mut(handle)?.from_another_schema = Some(uri.into());
        Ok(())
    }

    /// Attach complex type metadata; the element takes over the type's
    /// content model, introduced scope and attributes. `None` handle is a no-op.
    pub fn set_element_complex_type_info(
        &mut self,
        handle: Option<ElementDeclIndex>,
        info: Arc<ComplexTypeInfo>,
    ) -> Result<()> {
        let Some(handle) = handle else {
            return Ok(());
        };
        let decl = self.element_decl_mut(handle)?;
        decl.content = info.content.clone();
        decl.defined_scope = Some(info.scope);
        decl.complex_type = Some(Arc::clone(&info));
        for attribute in &info.attributes {
            self.add_attribute_decl(handle, attribute.clone())?;
        }
        trace!(handle = handle.index(), "filled complex type info");
        Ok(())
    }

    /// Replace the content model of an element
    pub fn set_element_content(&mut self, handle: ElementDeclIndex, content: ContentKind) -> Result<()> {
        self.element_decl_mut(handle)?.content = content;
        Ok(())
    }

    /// Record the substitution group head of an element
    pub fn set_element_substitution_group(
        &mut self,
        handle: ElementDeclIndex,
        head: FullName,
    ) -> Result<()> {
        self.element_decl_mut(handle)?.substitution_group = Some(head);
        Ok(())
    }

    /// Record the legacy equivalence class head of an element
    pub fn set_element_equiv_class(&mut self, handle: ElementDeclIndex, head: FullName) -> Result<()> {
        self.element_decl_mut(handle)?.equiv_class = Some(head);
        Ok(())
    }

    /// Number of reserved element handles
    pub fn element_decl_count(&self) -> usize {
        self.elements.len()
    }

    /// Iterate over written element declarations
    pub fn element_decls(&self) -> impl Iterator<Item = (ElementDeclIndex, &ElementDecl)> {
        self.elements
            .iter()
            .map(|(index, decl)| (ElementDeclIndex::from(index), decl))
    }

    // =========================================================================
    // Content-spec nodes
    // =========================================================================

    /// Reserve the next content-spec handle
    pub fn create_content_spec(&mut self) -> Result<ContentSpecIndex> {
        self.limits.check_content_spec_nodes(self.content_specs.len() + 1)?;
        Ok(ContentSpecIndex::from(self.content_specs.reserve()))
    }

    /// Overwrite a reserved content-spec node
    pub fn set_content_spec(&mut self, handle: ContentSpecIndex, node: ContentSpecNode) -> Result<()> {
        for operand in node.operands() {
            if !self.content_specs.is_reserved(operand.index()) {
                return Err(Error::out_of_range(HandleKind::ContentSpec, operand.index()));
            }
        }
        if self.content_specs.set(handle.index(), node) {
            Ok(())
        } else {
            Err(Error::out_of_range(HandleKind::ContentSpec, handle.index()))
        }
    }

    /// Read a content-spec node
    pub fn content_spec(&self, handle: ContentSpecIndex) -> Result<&ContentSpecNode> {
        self.content_specs
            .get(handle.index())
            .ok_or_else(|| Error::out_of_range(HandleKind::ContentSpec, handle.index()))
    }

    /// Reserve and write a content-spec node in one step
    pub fn add_content_spec(&mut self, node: ContentSpecNode) -> Result<ContentSpecIndex> {
        let handle = self.create_content_spec()?;
        self.set_content_spec(handle, node)?;
        Ok(handle)
    }

    /// Number of reserved content-spec handles
    pub fn content_spec_count(&self) -> usize {
        self.content_specs.len()
    }

    // =========================================================================
    // Attribute declarations
    // =========================================================================

    /// Reserve the next attribute handle
    pub fn create_attribute_decl(&mut self) -> AttributeDeclIndex {
        AttributeDeclIndex::from(self.attributes.reserve())
    }

    /// Append an attribute to the end of an element's attribute list
    pub fn add_attribute_decl(
        &mut self,
        owner: ElementDeclIndex,
        mut decl: AttributeDecl,
    ) -> Result<AttributeDeclIndex> {
        let tail = self.element_decl(owner)?.last_attribute;
        decl.next = None;
        let handle = self.create_attribute_decl();
        self.attributes.set(handle.index(), decl);
        match tail {
            Some(tail) => {
                if let Some(previous) = self.attributes.get_mut(tail.index()) {
                    previous.next = Some(handle);
                }
            }
            None => self.element_decl_mut(owner)?.first_attribute = Some(handle),
        }
        self.element_decl_mut(owner)?.last_attribute = Some(handle);
        Ok(handle)
    }

    /// Read an attribute declaration
    pub fn attribute_decl(&self, handle: AttributeDeclIndex) -> Result<&AttributeDecl> {
        self.attributes
            .get(handle.index())
            .ok_or_else(|| Error::out_of_range(HandleKind::Attribute, handle.index()))
    }

    /// Walk an element's attribute list in declaration order
    pub fn attributes(
        &self,
        owner: ElementDeclIndex,
    ) -> Result<impl Iterator<Item = (AttributeDeclIndex, &AttributeDecl)>> {
        let mut cursor = self.element_decl(owner)?.first_attribute;
        Ok(std::iter::from_fn(move || {
            let handle = cursor?;
            let decl = self.attributes.get(handle.index())?;
            cursor = decl.next;
            Some((handle, decl))
        }))
    }
}
