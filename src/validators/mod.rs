//! Content-model validators
//!
//! This module contains the validation logic that runs against a stored
//! grammar: datatype checks for simple content, compiled content models for
//! element children, insertion-point analysis and substitution-group
//! resolution.

pub mod automaton;
pub mod datatypes;
pub mod elements;
pub mod groups;
pub mod models;
pub mod particles;
pub mod simple;
pub mod substitution;

// Re-exports
pub use automaton::PositionAutomaton;
pub use datatypes::{builtin, DatatypeFailure, DatatypeValidator, RestrictedDatatype};
pub use elements::{ElementForm, ElementValidator};
pub use groups::{GroupParticle, ModelGroup, ModelType};
pub use models::{
    Child, ContentModel, ExactMatch, InsertCandidate, InsertResult, MixedContentModel,
    NameMatcher, ValidResult,
};
pub use particles::{parse_occurs, Occurs};
pub use simple::{SimpleContentModel, SimpleOp};
pub use substitution::SubstitutionResolver;
