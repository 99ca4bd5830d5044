//! Serializable grammar summaries for inspection tools

use serde::Serialize;

use crate::error::{Error, Result};
use crate::symbols::NameTable;

use super::decls::{ContentKind, ContentSpecNode, Scope};
use super::handles::ContentSpecIndex;
use super::store::{Grammar, GrammarKind};

/// Summary of one grammar
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrammarSummary {
    /// Target namespace
    pub target_namespace: Option<String>,
    /// "schema" or "dtd"
    pub kind: String,
    /// Element declarations in handle order
    pub elements: Vec<ElementSummary>,
    /// Number of content-spec nodes
    pub content_spec_nodes: usize,
}

/// Summary of one element declaration
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    /// Handle
    pub handle: usize,
    /// Clark-notation name
    pub name: String,
    /// Enclosing scope (-1 = top-level)
    pub scope: i64,
    /// Defined scope, if assigned
    pub defined_scope: Option<i64>,
    /// Content kind
    pub content: String,
    /// Rendered content model
    pub model: Option<String>,
    /// Substitution group head
    pub substitution_group: Option<String>,
    /// Equivalence class head
    pub equiv_class: Option<String>,
    /// Attribute names in declaration order
    pub attributes: Vec<String>,
}

impl GrammarSummary {
    /// Summarize a grammar
    pub fn build(grammar: &Grammar, table: &dyn NameTable) -> Result<Self> {
        let mut elements = Vec::new();
        for (handle, decl) in grammar.element_decls() {
            let model = match decl.content.content_spec() {
                Some(root) => Some(render_content_spec(grammar, table, root)?),
                None if matches!(decl.content, ContentKind::Mixed(None)) => Some("(#PCDATA)".to_string()),
                None => None,
            };
            let attributes = grammar
                .attributes(handle)?
                .map(|(_, attr)| attr.name.display(table))
                .collect();
            elements.push(ElementSummary {
                handle: handle.index(),
                name: decl.name.display(table),
                scope: decl.enclosing_scope.to_raw(),
                defined_scope: decl.defined_scope.map(Scope::to_raw),
                content: decl.content.kind_name().to_string(),
                model,
                substitution_group: decl.substitution_group.as_ref().map(ToString::to_string),
                equiv_class: decl.equiv_class.as_ref().map(ToString::to_string),
                attributes,
            });
        }

        Ok(Self {
            target_namespace: grammar
                .target_namespace()
                .and_then(|ns| table.resolve(ns))
                .map(str::to_string),
            kind: match grammar.kind() {
                GrammarKind::Schema => "schema".to_string(),
                GrammarKind::Dtd => "dtd".to_string(),
            },
            elements,
            content_spec_nodes: grammar.content_spec_count(),
        })
    }

    /// Number of top-level element declarations
    pub fn global_elements(&self) -> usize {
        self.elements.iter().filter(|e| e.scope == -1).count()
    }
}

/// Render a content-spec tree in DTD-like notation, e.g. `(a,(b|c)*)`
pub fn render_content_spec(
    grammar: &Grammar,
    table: &dyn NameTable,
    root: ContentSpecIndex,
) -> Result<String> {
    fn render(
        grammar: &Grammar,
        table: &dyn NameTable,
        node: ContentSpecIndex,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        grammar.limits().check_content_spec_depth(depth)?;
        match *grammar.content_spec(node)? {
            ContentSpecNode::Leaf(name) => out.push_str(&name.display(table)),
            ContentSpecNode::ZeroOrOne(child) => {
                render(grammar, table, child, depth + 1, out)?;
                out.push('?');
            }
            ContentSpecNode::ZeroOrMore(child) => {
                render(grammar, table, child, depth + 1, out)?;
                out.push('*');
            }
            ContentSpecNode::OneOrMore(child) => {
                render(grammar, table, child, depth + 1, out)?;
                out.push('+');
            }
            ContentSpecNode::Choice(first, second) => {
                render_pair(grammar, table, (first, second), '|', depth, out)?;
            }
            ContentSpecNode::Sequence(first, second) => {
                render_pair(grammar, table, (first, second), ',', depth, out)?;
            }
        }
        Ok(())
    }

    fn render_pair(
        grammar: &Grammar,
        table: &dyn NameTable,
        (first, second): (ContentSpecIndex, ContentSpecIndex),
        separator: char,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        out.push('(');
        render(grammar, table, first, depth + 1, out)?;
        out.push(separator);
        render(grammar, table, second, depth + 1, out)?;
        out.push(')');
        Ok(())
    }

    let mut out = String::new();
    render(grammar, table, root, 0, &mut out).map_err(|e| match e {
        Error::LimitExceeded(msg) => Error::Internal(format!("content model too deep or cyclic: {}", msg)),
        other => other,
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QualifiedName;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_render_and_summarize() {
        let mut table = SymbolTable::new();
        let mut grammar = Grammar::new(None);
        let a = grammar
            .add_content_spec(ContentSpecNode::Leaf(QualifiedName::intern(&mut table, "", "a")))
            .unwrap();
        let b = grammar
            .add_content_spec(ContentSpecNode::Leaf(QualifiedName::intern(&mut table, "", "b")))
            .unwrap();
        let seq = grammar.add_content_spec(ContentSpecNode::Sequence(a, b)).unwrap();
        let star = grammar.add_content_spec(ContentSpecNode::ZeroOrMore(seq)).unwrap();
        assert_eq!(render_content_spec(&grammar, &table, star).unwrap(), "(a,b)*");

        let root = QualifiedName::intern(&mut table, "", "root");
        grammar.add_element_decl(root, Scope::TopLevel, Scope::TopLevel, ContentKind::Children(star));
        let summary = GrammarSummary::build(&grammar, &table).unwrap();
        assert_eq!(summary.global_elements(), 1);
        assert_eq!(summary.elements[0].model.as_deref(), Some("(a,b)*"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["contentSpecNodes"], 4);
    }
}
