//! Limits and constraints for grammar storage and validation
//!
//! This module bounds the work the grammar store and the resolvers may do,
//! protecting against cyclic substitution links and degenerate content
//! models.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of substitution/equivalence hops followed by the resolver
    pub max_substitution_depth: usize,

    /// log2 of the number of declarations per storage chunk
    pub chunk_shift: u32,

    /// Maximum nesting depth of a content-spec tree
    pub max_content_spec_depth: usize,

    /// Maximum number of content-spec nodes per grammar
    pub max_content_spec_nodes: usize,

    /// Maximum number of copies a bounded `minOccurs`/`maxOccurs` particle
    /// may expand into
    pub max_occurs_expansion: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_substitution_depth: 16,
            chunk_shift: 8, // 256 declarations per chunk
            max_content_spec_depth: 256,
            max_content_spec_nodes: 1_000_000,
            max_occurs_expansion: 1_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_substitution_depth: 8,
            chunk_shift: 6,
            max_content_spec_depth: 64,
            max_content_spec_nodes: 10_000,
            max_occurs_expansion: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_substitution_depth: 64,
            chunk_shift: 10,
            max_content_spec_depth: 4096,
            max_content_spec_nodes: 100_000_000,
            max_occurs_expansion: 100_000,
        }
    }

    /// Number of slots in one storage chunk
    pub fn chunk_size(&self) -> usize {
        1 << self.chunk_shift
    }

    /// Check if a content-spec tree depth is within limits
    pub fn check_content_spec_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_content_spec_depth {
            Err(Error::LimitExceeded(format!(
                "content-spec depth {} exceeds maximum {}",
                depth, self.max_content_spec_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of content-spec nodes is within limits
    pub fn check_content_spec_nodes(&self, count: usize) -> Result<()> {
        if count > self.max_content_spec_nodes {
            Err(Error::LimitExceeded(format!(
                "content-spec node count {} exceeds maximum {}",
                count, self.max_content_spec_nodes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if an occurrence range may be expanded into `copies` particles
    pub fn check_occurs_expansion(&self, copies: usize) -> Result<()> {
        if copies > self.max_occurs_expansion {
            Err(Error::LimitExceeded(format!(
                "occurrence range expands to {} particles, maximum is {}",
                copies, self.max_occurs_expansion
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_substitution_depth, 16);
        assert_eq!(limits.chunk_size(), 256);
        assert!(limits.check_content_spec_depth(100).is_ok());
        assert!(limits.check_content_spec_depth(300).is_err());
        assert!(limits.check_occurs_expansion(500).is_ok());
        assert!(limits.check_occurs_expansion(1_000_000).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_content_spec_depth < Limits::default().max_content_spec_depth);
        assert_eq!(limits.chunk_size(), 64);
        assert!(limits.check_content_spec_nodes(20_000).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_substitution_depth > Limits::default().max_substitution_depth);
        assert!(limits.check_content_spec_depth(1000).is_ok());
    }
}
