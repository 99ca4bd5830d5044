//! # xmlschema-grammar
//!
//! Grammar store, content-model validation and substitution-group resolution
//! for XML Schema processors.
//!
//! ## Features
//!
//! - Handle-addressed storage of element, attribute and content-spec declarations
//! - Content-model validation of an element's child sequence
//! - Insertion-point analysis ("what can go here") for editors
//! - Substitution group and legacy equivalence class resolution across namespaces
//! - Datatype checks for simple content and typed attributes
//! - Ingestion of an XSD subset into a grammar
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmlschema_grammar::{
//!     ingest, Child, ElementValidator, GrammarPool, GrammarResolver, QualifiedName, Scope, SymbolTable,
//! };
//!
//! let mut pool = GrammarPool::new();
//! let mut names = SymbolTable::new();
//! ingest::ingest_file(&mut pool, &mut names, "order.xsd")?;
//!
//! let grammar = pool.grammar("urn:order").unwrap();
//! let order = QualifiedName::lookup(&names, "urn:order", "order").unwrap();
//! let handle = grammar.element_decl_index(&order, Scope::TopLevel).unwrap();
//! let item = QualifiedName::lookup(&names, "urn:order", "item").unwrap();
//!
//! let validator = ElementValidator::new(grammar, &names);
//! let result = validator.validate_content(handle, &[Child::Element(item)], None)?;
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod limits;

// Names
pub mod names;
pub mod namespaces;
pub mod symbols;

// Declaration storage
pub mod grammar;

// Validation
pub mod validators;

// Schema document ingestion
pub mod ingest;

// Re-exports for convenience
pub use error::{Error, Result};
pub use grammar::{
    ContentKind, ContentSpecIndex, ContentSpecNode, ElementDeclIndex, Grammar, GrammarKind,
    GrammarPool, GrammarResolver, LinkKind, Scope,
};
pub use limits::Limits;
pub use names::FullName;
pub use namespaces::QualifiedName;
pub use symbols::{NameTable, Symbol, SymbolTable};
pub use validators::{
    Child, ContentModel, ElementValidator, InsertResult, SubstitutionResolver, ValidResult,
};

/// Version of the xmlschema-grammar library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
