//! Grammar storage
//!
//! This module contains the declaration store used by the content-model
//! validators: element, attribute and content-spec declarations addressed by
//! stable handles, plus the pool that maps namespaces to grammars.

pub mod chunked;
pub mod decls;
pub mod handles;
pub mod pool;
pub mod store;
pub mod summary;

pub use decls::{
    AttributeDecl, AttributeType, ComplexTypeInfo, ContentKind, ContentSpecNode, DefaultKind,
    ElementDecl, LinkKind, Scope,
};
pub use handles::{AttributeDeclIndex, ContentSpecIndex, ElementDeclIndex};
pub use pool::{GrammarPool, GrammarResolver};
pub use store::{Grammar, GrammarKind};
pub use summary::{render_content_spec, ElementSummary, GrammarSummary};
