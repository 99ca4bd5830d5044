//! Schema document ingestion
//!
//! Reads an XSD document with `roxmltree` and fills the grammar registered
//! for its target namespace. Only the subset of XSD that maps onto the
//! grammar store is understood: global and local elements, named and
//! anonymous complex types with `sequence`/`choice` groups and attributes,
//! simple type restrictions with enumeration and pattern facets.
//!
//! Malformed components do not stop ingestion. Each problem is recorded as
//! a [`ParseError`] in the returned [`IngestReport`] and the offending field
//! is left unset.
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#layer2

pub mod components;
pub mod traverse;

use std::path::Path;

use tracing::debug;

use crate::error::{Error, ParseError, Result};
use crate::grammar::{Grammar, GrammarKind, GrammarPool};
use crate::limits::Limits;
use crate::symbols::NameTable;

use components::ComponentTag;
use traverse::{TraversalContext, Traverser};

pub use components::{SchemaComponent, Transition};

/// Outcome of ingesting one schema document
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Target namespace of the document ("" for none)
    pub target_namespace: String,
    /// Element declarations in the grammar after ingestion
    pub element_decls: usize,
    /// Content-spec nodes in the grammar after ingestion
    pub content_spec_nodes: usize,
    /// Problems recorded during traversal
    pub errors: Vec<ParseError>,
}

impl IngestReport {
    /// Whether ingestion recorded no problems
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Ingest a schema document held in memory with default limits
pub fn ingest_str(pool: &mut GrammarPool, names: &mut dyn NameTable, xsd: &str) -> Result<IngestReport> {
    ingest_str_with_limits(pool, names, xsd, Limits::default())
}

/// Ingest a schema document held in memory
///
/// `limits` apply when the grammar for the document's namespace is created
/// by this call; an existing grammar keeps its own.
pub fn ingest_str_with_limits(
    pool: &mut GrammarPool,
    names: &mut dyn NameTable,
    xsd: &str,
    limits: Limits,
) -> Result<IngestReport> {
    let doc = roxmltree::Document::parse(xsd)?;
    let schema = doc.root_element();
    if ComponentTag::of(schema) != ComponentTag::Schema {
        return Err(ParseError::new(format!(
            "root element <{}> is not xs:schema",
            schema.tag_name().name()
        ))
        .into());
    }

    let ctx = TraversalContext::new(schema);
    let target_namespace = ctx.target_namespace.clone();
    let ns_symbol = (!target_namespace.is_empty()).then(|| names.intern(&target_namespace));
    let grammar = pool.entry(&target_namespace, || {
        Grammar::with_limits(GrammarKind::Schema, ns_symbol, limits)
    });
    if grammar.kind() != GrammarKind::Schema {
        return Err(Error::Internal(format!(
            "namespace '{}' is already owned by a DTD grammar",
            target_namespace
        )));
    }

    let mut traverser = Traverser::new(grammar, names, ctx);
    traverser.schema(schema);
    let ctx = traverser.finish();

    let report = IngestReport {
        element_decls: grammar.element_decl_count(),
        content_spec_nodes: grammar.content_spec_count(),
        target_namespace,
        errors: ctx.errors,
    };
    debug!(
        namespace = %report.target_namespace,
        elements = report.element_decls,
        errors = report.errors.len(),
        "ingested schema"
    );
    Ok(report)
}

/// Ingest a schema document from disk
pub fn ingest_file(
    pool: &mut GrammarPool,
    names: &mut dyn NameTable,
    path: impl AsRef<Path>,
) -> Result<IngestReport> {
    let text = std::fs::read_to_string(path.as_ref())?;
    ingest_str(pool, names, &text)
}
