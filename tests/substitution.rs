//! Substitution group resolution across grammars

use xmlschema_grammar::validators::ExactMatch;
use xmlschema_grammar::{
    Child, ContentKind, ContentModel, ContentSpecNode, FullName, Grammar, GrammarKind,
    GrammarPool, Limits, LinkKind, QualifiedName, Scope, SubstitutionResolver, SymbolTable,
};

/// Declare `local` in the grammar for `uri`, optionally linked to a head
fn declare(
    pool: &mut GrammarPool,
    table: &mut SymbolTable,
    uri: &str,
    local: &str,
    head: Option<(&str, &str)>,
) -> QualifiedName {
    let name = QualifiedName::intern(table, uri, local);
    let grammar = pool.entry(uri, || Grammar::new(None));
    let handle = grammar.add_element_decl(name, Scope::TopLevel, Scope::TopLevel, ContentKind::Any);
    if let Some((head_uri, head_local)) = head {
        grammar
            .set_element_substitution_group(handle, FullName::new(head_uri, head_local))
            .unwrap();
    }
    name
}

/// e0 -> e1 -> ... -> e{links}
fn chain(pool: &mut GrammarPool, table: &mut SymbolTable, links: usize) -> Vec<QualifiedName> {
    let locals: Vec<String> = (0..=links).map(|i| format!("e{}", i)).collect();
    (0..=links)
        .map(|i| {
            let head = locals.get(i + 1).map(|next| ("", next.as_str()));
            declare(pool, table, "", &locals[i], head)
        })
        .collect()
}

#[test]
fn test_hop_cap() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let names = chain(&mut pool, &mut table, 17);
    let resolver = SubstitutionResolver::new(&pool, &table);

    assert!(resolver.is_substitutable(&names[0], &names[1]));
    assert!(resolver.is_substitutable(&names[0], &names[16]));
    assert!(resolver.is_substitutable(&names[1], &names[17]));
    assert!(!resolver.is_substitutable(&names[0], &names[17]));
}

#[test]
fn test_hop_cap_follows_limits() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let names = chain(&mut pool, &mut table, 10);
    let strict = SubstitutionResolver::new(&pool, &table).with_limits(&Limits::strict());
    assert!(strict.is_substitutable(&names[0], &names[8]));
    assert!(!strict.is_substitutable(&names[0], &names[9]));
}

#[test]
fn test_reflexive_and_transitive() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let c = declare(&mut pool, &mut table, "", "c", None);
    let b = declare(&mut pool, &mut table, "", "b", Some(("", "c")));
    let a = declare(&mut pool, &mut table, "", "a", Some(("", "b")));
    let unknown = QualifiedName::intern(&mut table, "urn:nowhere", "x");

    let resolver = SubstitutionResolver::new(&pool, &table);
    for name in [a, b, c, unknown] {
        assert!(resolver.is_substitutable(&name, &name));
    }
    assert!(resolver.is_substitutable(&a, &b));
    assert!(resolver.is_substitutable(&b, &c));
    assert!(resolver.is_substitutable(&a, &c));
    assert!(!resolver.is_substitutable(&c, &a));
    assert!(!resolver.is_substitutable(&unknown, &c));
}

#[test]
fn test_cross_namespace_chain() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let shape = declare(&mut pool, &mut table, "urn:base", "shape", None);
    let polygon = declare(&mut pool, &mut table, "urn:ext", "polygon", Some(("urn:base", "shape")));
    let square = declare(&mut pool, &mut table, "urn:more", "square", Some(("urn:ext", "polygon")));
    // same local name, different namespace
    let other = declare(&mut pool, &mut table, "urn:other", "polygon", None);

    let resolver = SubstitutionResolver::new(&pool, &table);
    assert!(resolver.is_substitutable(&square, &shape));
    assert!(resolver.is_substitutable(&polygon, &shape));
    assert!(!resolver.is_substitutable(&other, &shape));
    assert_eq!(resolver.head_of(&square), Some(polygon));
}

#[test]
fn test_missing_grammar_is_not_substitutable() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let head = declare(&mut pool, &mut table, "urn:base", "head", None);
    // link into a namespace with no grammar
    let orphan = declare(&mut pool, &mut table, "urn:ext", "orphan", Some(("urn:gone", "middle")));
    let resolver = SubstitutionResolver::new(&pool, &table);
    assert!(!resolver.is_substitutable(&orphan, &head));
}

#[test]
fn test_dtd_grammar_is_not_substitutable() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let head = QualifiedName::intern(&mut table, "", "head");
    let member = QualifiedName::intern(&mut table, "", "member");

    let mut grammar = Grammar::with_limits(GrammarKind::Dtd, None, Limits::default());
    grammar.add_element_decl(head, Scope::TopLevel, Scope::TopLevel, ContentKind::Any);
    let handle = grammar.add_element_decl(member, Scope::TopLevel, Scope::TopLevel, ContentKind::Any);
    grammar
        .set_element_substitution_group(handle, FullName::new("", "head"))
        .unwrap();
    pool.insert("", grammar);

    let resolver = SubstitutionResolver::new(&pool, &table);
    assert!(!resolver.is_substitutable(&member, &head));
    assert!(resolver.is_substitutable(&head, &head));
}

#[test]
fn test_equiv_class_resolution() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let head = declare(&mut pool, &mut table, "", "head", None);
    let member = QualifiedName::intern(&mut table, "", "member");
    let grammar = pool.grammar_mut("").unwrap();
    let handle = grammar.add_element_decl(member, Scope::TopLevel, Scope::TopLevel, ContentKind::Any);
    grammar.set_element_equiv_class(handle, FullName::new("", "head")).unwrap();

    let by_group = SubstitutionResolver::new(&pool, &table);
    let by_class = SubstitutionResolver::new(&pool, &table).with_link(LinkKind::EquivClass);
    assert!(!by_group.is_substitutable(&member, &head));
    assert!(by_class.is_substitutable(&member, &head));
}

#[test]
fn test_resolver_as_content_matcher() {
    let mut pool = GrammarPool::new();
    let mut table = SymbolTable::new();
    let head = declare(&mut pool, &mut table, "", "head", None);
    let member = declare(&mut pool, &mut table, "", "member", Some(("", "head")));

    let mut grammar = Grammar::new(None);
    let leaf = grammar.add_content_spec(ContentSpecNode::Leaf(head)).unwrap();
    let plus = grammar.add_content_spec(ContentSpecNode::OneOrMore(leaf)).unwrap();
    let model = ContentModel::from_spec(&grammar, plus).unwrap();

    let children = vec![Child::Element(head), Child::Element(member)];
    let resolver = SubstitutionResolver::new(&pool, &table);
    assert!(model.validate(&children, &resolver).is_valid());
    assert_eq!(model.validate(&children, &ExactMatch).error_index(), Some(1));
}
