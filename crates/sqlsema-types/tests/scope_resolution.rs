//! Table resolution through WITH and recursive WITH scope chains

use pretty_assertions::assert_eq;
use sqlsema_ast::{Ast, NodeId, SqlTypeName};
use sqlsema_types::SqlType;
use sqlsema_types::ValidationError;
use sqlsema_types::semantic::{
    NamespaceId, NamespaceKind, NamespaceRegistry, Namespaces, Path, ResolvedCollector, ScopeArena,
    ScopeId, name_matcher,
};

fn names(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn int_row(column: &str) -> SqlType {
    SqlType::row([(column, SqlType::new(SqlTypeName::Integer))])
}

#[derive(Default)]
struct Fixture {
    ast: Ast,
    namespaces: Namespaces,
    scopes: ScopeArena,
}

impl Fixture {
    fn with_item(&mut self, name: &str, recursive: bool) -> (NodeId, NamespaceId) {
        let query = self.ast.select(Vec::new(), Vec::new());
        let item = self.ast.with_item(name, None, query, recursive);
        let ns = self
            .namespaces
            .register(item, NamespaceKind::WithItem, None);
        self.namespaces.set_row_type(ns, int_row("X")).unwrap();
        (item, ns)
    }

    fn resolve(&self, scope: ScopeId, name: &str) -> Result<NamespaceId, ValidationError> {
        self.scopes
            .resolve_table_or_err(scope, &names(&[name]), name_matcher(true), &self.namespaces)
            .map(|resolve| resolve.namespace)
    }
}

/// `WITH t1 AS (..), t2 AS (..), t3 AS (..) main`
struct Chain {
    fixture: Fixture,
    bodies: [ScopeId; 3],
    main: ScopeId,
    items: [NamespaceId; 3],
}

fn chain() -> Chain {
    let mut fixture = Fixture::default();
    let root = fixture.scopes.root();
    let enclosing = fixture.scopes.new_base(root, None).unwrap();

    let mut parent = enclosing;
    let mut bodies = Vec::new();
    let mut items = Vec::new();
    for name in ["t1", "t2", "t3"] {
        let (item, ns) = fixture.with_item(name, false);
        bodies.push(fixture.scopes.new_base(parent, Some(item)).unwrap());
        parent = fixture.scopes.new_with_item(parent, item, name).unwrap();
        items.push(ns);
    }
    let main = fixture.scopes.new_base(parent, None).unwrap();

    Chain {
        fixture,
        bodies: [bodies[0], bodies[1], bodies[2]],
        main,
        items: [items[0], items[1], items[2]],
    }
}

#[test]
fn test_item_sees_only_preceding_items() {
    let Chain {
        fixture,
        bodies,
        items,
        ..
    } = chain();

    assert_eq!(fixture.resolve(bodies[1], "t1"), Ok(items[0]));
    assert_eq!(fixture.resolve(bodies[2], "t2"), Ok(items[1]));
    assert_eq!(
        fixture.resolve(bodies[0], "t2"),
        Err(ValidationError::ObjectNotFound { name: "t2".into() })
    );
    assert_eq!(
        fixture.resolve(bodies[1], "t2"),
        Err(ValidationError::ObjectNotFound { name: "t2".into() })
    );
    assert_eq!(
        fixture.scopes.get_table_namespace(
            bodies[0],
            &names(&["t3"]),
            name_matcher(true),
            &fixture.namespaces
        ),
        Ok(None)
    );
}

#[test]
fn test_main_query_sees_every_item() {
    let Chain {
        fixture,
        main,
        items,
        ..
    } = chain();

    for (name, ns) in ["t1", "t2", "t3"].into_iter().zip(items) {
        assert_eq!(fixture.resolve(main, name), Ok(ns));
        assert_eq!(
            fixture.scopes.get_table_namespace_or_err(
                main,
                &names(&[name]),
                name_matcher(true),
                &fixture.namespaces
            ),
            Ok(ns)
        );
    }
}

#[test]
fn test_with_match_builds_fully_qualified_step() {
    let Chain { fixture, main, .. } = chain();
    let mut collector = ResolvedCollector::new();
    fixture
        .scopes
        .resolve_table(
            main,
            &names(&["t2"]),
            name_matcher(true),
            &Path::empty(),
            &fixture.namespaces,
            &mut collector,
        )
        .unwrap();

    let resolve = collector.only().unwrap();
    assert!(!resolve.nullable);
    assert!(resolve.remaining_names.is_empty());
    let step = resolve.path.last().unwrap();
    assert_eq!(step.name, "t2");
    assert_eq!(step.ordinal, 0);
    assert_eq!(step.row_type, int_row("X"));
}

#[test]
fn test_with_item_names_compare_exactly() {
    let Chain { fixture, main, .. } = chain();
    let err = fixture
        .scopes
        .resolve_table_or_err(main, &names(&["T1"]), name_matcher(false), &fixture.namespaces)
        .unwrap_err();
    assert_eq!(err, ValidationError::ObjectNotFound { name: "T1".into() });

    // two-part names never match a WITH item
    let mut collector = ResolvedCollector::new();
    fixture
        .scopes
        .resolve_table(
            main,
            &names(&["t1", "X"]),
            name_matcher(true),
            &Path::empty(),
            &fixture.namespaces,
            &mut collector,
        )
        .unwrap();
    assert!(collector.first().is_none());
}

#[test]
fn test_recursive_self_reference_uses_recursive_namespace() {
    let mut fixture = Fixture::default();
    let root = fixture.scopes.root();
    let enclosing = fixture.scopes.new_base(root, None).unwrap();
    let (item, plain) = fixture.with_item("r", true);
    let recursive = fixture.namespaces.get_or_create_recursive(item).unwrap();

    let recursive_scope = fixture
        .scopes
        .new_recursive_with_item(enclosing, item, "r")
        .unwrap();
    let body = fixture.scopes.new_base(recursive_scope, Some(item)).unwrap();
    let after = fixture.scopes.new_with_item(enclosing, item, "r").unwrap();
    let main = fixture.scopes.new_base(after, None).unwrap();

    let inside = fixture
        .scopes
        .resolve_table_or_err(body, &names(&["r"]), name_matcher(true), &fixture.namespaces)
        .unwrap();
    assert_eq!(inside.namespace, recursive);
    assert_eq!(inside.scope, recursive_scope);
    assert!(fixture.namespaces.namespace(recursive).unwrap().is_recursive());

    assert_eq!(fixture.resolve(main, "r"), Ok(plain));
    assert_ne!(plain, recursive);

    // the single-result lookup yields the item's own namespace
    assert_eq!(
        fixture.scopes.get_table_namespace(
            body,
            &names(&["r"]),
            name_matcher(true),
            &fixture.namespaces
        ),
        Ok(Some(plain))
    );
}

#[test]
fn test_recursive_scope_without_namespace_is_internal_error() {
    let mut fixture = Fixture::default();
    let root = fixture.scopes.root();
    let (item, _) = fixture.with_item("r", true);
    let scope = fixture.scopes.new_recursive_with_item(root, item, "r").unwrap();

    let err = fixture.resolve(scope, "r").unwrap_err();
    assert!(matches!(err, ValidationError::Internal(_)));
}

#[test]
fn test_closer_match_shadows_outer_bindings() {
    let mut fixture = Fixture::default();
    let root = fixture.scopes.root();
    let catalog_t1 = fixture
        .namespaces
        .register_table(names(&["t1"]), int_row("C"));
    fixture
        .scopes
        .add_child(root, ["t1"], catalog_t1, false)
        .unwrap();

    let (outer_item, outer_ns) = fixture.with_item("t1", false);
    let outer = fixture.scopes.new_with_item(root, outer_item, "t1").unwrap();
    let (inner_item, inner_ns) = fixture.with_item("t1", false);
    let inner = fixture.scopes.new_with_item(outer, inner_item, "t1").unwrap();
    let query = fixture.scopes.new_base(inner, None).unwrap();

    assert_eq!(fixture.resolve(query, "t1"), Ok(inner_ns));
    assert_eq!(fixture.resolve(outer, "t1"), Ok(outer_ns));
    assert_eq!(fixture.resolve(root, "t1"), Ok(catalog_t1));
}

#[test]
fn test_catalog_table_with_qualifier_leaves_column() {
    let mut fixture = Fixture::default();
    let root = fixture.scopes.root();
    let emp = fixture
        .namespaces
        .register_table(names(&["SALES", "EMP"]), int_row("EMPNO"));
    fixture
        .scopes
        .add_child(root, ["SALES", "EMP"], emp, false)
        .unwrap();
    let query = fixture.scopes.new_base(root, None).unwrap();

    let resolve = fixture
        .scopes
        .resolve_table_or_err(
            query,
            &names(&["sales", "emp", "empno"]),
            name_matcher(false),
            &fixture.namespaces,
        )
        .unwrap();
    assert_eq!(resolve.namespace, emp);
    assert_eq!(resolve.remaining_names, names(&["empno"]));
    assert_eq!(resolve.path.to_string(), "SALES.EMP");
}
