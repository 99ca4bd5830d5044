//! Element-level validation
//!
//! [`ElementValidator`] is the query surface a document-validation driver
//! uses once an element's children and attributes have been collected. It
//! compiles the declared content model, checks simple content with the
//! declared datatype and checks attributes against the element's attribute
//! list.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cvc-elt

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::error::{Error, Result, ValidationError};
use crate::grammar::{
    AttributeDecl, AttributeType, ContentKind, DefaultKind, ElementDeclIndex, Grammar,
};
use crate::namespaces::QualifiedName;
use crate::symbols::NameTable;

use super::datatypes::DatatypeFailure;
use super::models::{Child, ContentModel, ExactMatch, InsertResult, NameMatcher, ValidResult};

/// Element form (qualified or unqualified)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementForm {
    /// Element name must be namespace-qualified
    Qualified,
    /// Element name is unqualified
    #[default]
    Unqualified,
}

impl ElementForm {
    /// Parse from string attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

/// Validates children and attributes of elements declared in one grammar
///
/// Content models are compiled on first use and kept for the lifetime of
/// the validator.
pub struct ElementValidator<'a> {
    grammar: &'a Grammar,
    names: &'a dyn NameTable,
    matcher: &'a dyn NameMatcher,
    models: RefCell<HashMap<ElementDeclIndex, Rc<ContentModel>>>,
}

impl<'a> ElementValidator<'a> {
    /// Validator matching child names by identity
    pub fn new(grammar: &'a Grammar, names: &'a dyn NameTable) -> Self {
        Self {
            grammar,
            names,
            matcher: &ExactMatch,
            models: RefCell::new(HashMap::new()),
        }
    }

    /// Use another name matcher, typically a substitution resolver
    pub fn with_matcher(mut self, matcher: &'a dyn NameMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Compiled content model of an element
    pub fn content_model(&self, elem: ElementDeclIndex) -> Result<Rc<ContentModel>> {
        if let Some(model) = self.models.borrow().get(&elem) {
            return Ok(Rc::clone(model));
        }
        let decl = self.grammar.element_decl(elem)?;
        let model = Rc::new(ContentModel::build(self.grammar, &decl.content)?);
        trace!(handle = elem.index(), strategy = model.strategy(), "compiled content model");
        self.models.borrow_mut().insert(elem, Rc::clone(&model));
        Ok(model)
    }

    /// Number of content models compiled so far
    pub fn compiled_models(&self) -> usize {
        self.models.borrow().len()
    }

    /// Validate an element's children
    ///
    /// Simple content is checked by the declared datatype against `text`;
    /// a datatype rejection is returned as [`Error::Datatype`].
    pub fn validate_content(
        &self,
        elem: ElementDeclIndex,
        children: &[Child],
        text: Option<&str>,
    ) -> Result<ValidResult> {
        let decl = self.grammar.element_decl(elem)?;
        if let ContentKind::Simple(datatype) = &decl.content {
            if let Some(index) = children.iter().position(|c| !c.is_pcdata()) {
                return Ok(ValidResult::InvalidAt(index));
            }
            let value = text.unwrap_or("");
            trace!(datatype = datatype.name(), "validating simple content");
            datatype.validate(value).map_err(Error::from)?;
            return Ok(ValidResult::FullyValid);
        }
        Ok(self.content_model(elem)?.validate(children, self.matcher))
    }

    /// Insertion analysis for an element's children
    pub fn what_can_go_here(
        &self,
        elem: ElementDeclIndex,
        fully_valid: bool,
        children: &[Child],
        insert_at: usize,
    ) -> Result<InsertResult> {
        self.content_model(elem)?
            .what_can_go_here(fully_valid, children, insert_at, self.matcher)
    }

    /// Validate attribute values present on an element
    pub fn validate_attributes(
        &self,
        elem: ElementDeclIndex,
        attrs: &[(QualifiedName, &str)],
    ) -> Result<()> {
        let decl = self.grammar.element_decl(elem)?;
        let path = decl.name.display(self.names);
        let declared: Vec<&AttributeDecl> =
            self.grammar.attributes(elem)?.map(|(_, attr)| attr).collect();

        for (name, value) in attrs {
            let Some(attr) = declared.iter().find(|attr| attr.name == *name) else {
                return Err(ValidationError::new(format!(
                    "attribute '{}' is not declared",
                    name.display(self.names)
                ))
                .with_path(path.as_str())
                .into());
            };
            self.check_value(attr, value, &path)?;
        }

        for attr in &declared {
            let present = attrs.iter().any(|(name, _)| *name == attr.name);
            if attr.default_kind.is_required() && !present {
                return Err(ValidationError::new(format!(
                    "missing required attribute '{}'",
                    attr.name.display(self.names)
                ))
                .with_path(path.as_str())
                .into());
            }
        }
        Ok(())
    }

    fn check_value(&self, attr: &AttributeDecl, value: &str, path: &str) -> Result<()> {
        let invalid = |reason: String| -> Error {
            ValidationError::new(format!(
                "invalid value '{}' for attribute '{}'",
                value,
                attr.name.display(self.names)
            ))
            .with_path(path)
            .with_reason(reason)
            .into()
        };

        if attr.default_kind.is_fixed() {
            if let Some(fixed) = &attr.default_value {
                if fixed != value {
                    return Err(invalid(format!("value must be '{}'", fixed)));
                }
            }
        }
        if attr.attr_type == AttributeType::Enumeration {
            if let Some(values) = &attr.enumeration {
                if !values.iter().any(|v| v == value) {
                    return Err(invalid(format!("value must be one of {:?}", values)));
                }
            }
        }
        if let Some(datatype) = &attr.datatype {
            match datatype.validate(value) {
                Ok(()) => {}
                Err(DatatypeFailure::Invalid(e)) => return Err(invalid(e.to_string())),
                Err(DatatypeFailure::Internal(msg)) => return Err(Error::Internal(msg)),
            }
        }
        Ok(())
    }

    /// Values of declared defaults for attributes absent from `attrs`
    pub fn defaulted_attributes(
        &self,
        elem: ElementDeclIndex,
        attrs: &[(QualifiedName, &str)],
    ) -> Result<Vec<(QualifiedName, String)>> {
        Ok(self
            .grammar
            .attributes(elem)?
            .filter(|(_, attr)| matches!(attr.default_kind, DefaultKind::Default | DefaultKind::Fixed))
            .filter(|(_, attr)| !attrs.iter().any(|(name, _)| *name == attr.name))
            .filter_map(|(_, attr)| Some((attr.name, attr.default_value.clone()?)))
            .collect())
    }
}
