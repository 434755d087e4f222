use anyhow::Result;
use serde_json::json;
use std::collections::{BTreeSet, HashSet};

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{def, def_enclosing, info, reference, sym, uri};
use symbolgraph::index::WarningStage;
use symbolgraph::{Symbol, SymbolError, SymbolGraph};

fn class_with_method() -> Result<TestHarness> {
    let mut harness = TestHarness::new()?;
    harness.create_test_file("a/b.py", "class C:\n    def m(self):\n        pass\n")?;
    harness.add_document(
        "a/b.py",
        vec![
            def_enclosing("`a.b`/C#", 0, 6, 7, [0, 0, 3, 0]),
            def_enclosing("`a.b`/C#m().", 1, 8, 9, [1, 4, 3, 0]),
        ],
        vec![info("`a.b`/C#", "An example class")],
    );
    Ok(harness)
}

#[test]
fn test_class_and_method_along_path() -> Result<()> {
    let graph = class_with_method()?.graph()?;

    let symbols = graph.get_defined_symbols_along_path("a.b");
    let expected: BTreeSet<Symbol> = [sym("`a.b`/C#"), sym("`a.b`/C#m().")].into_iter().collect();
    assert_eq!(symbols, expected);

    let context = graph.get_symbol_context(&sym("`a.b`/C#m()."))?;
    assert_eq!(context.immediate_container, Some(sym("`a.b`/C#")));
    assert_eq!(context.definition_file.as_deref(), Some("a/b.py"));

    let class = graph.get_symbol_context(&sym("`a.b`/C#"))?;
    assert_eq!(class.documentation.as_deref(), Some("An example class"));
    assert!(class.direct_children.contains(&sym("`a.b`/C#m().")));
    assert!(class.to_string().contains("Documentation:"));
    Ok(())
}

#[test]
fn test_nested_module_paths() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.add_document("pkg/__init__.py", vec![def("`pkg`/VERSION.", 0, 0, 7)], vec![]);
    harness.add_document("pkg/sub/mod.py", vec![def("`pkg.sub.mod`/f().", 0, 4, 5)], vec![]);
    harness.add_document("pkgextra.py", vec![def("`pkgextra`/g().", 0, 4, 5)], vec![]);
    let graph = harness.graph()?;

    let under_pkg = graph.get_defined_symbols_along_path("pkg");
    assert_eq!(under_pkg.len(), 2);
    assert!(!under_pkg.contains(&sym("`pkgextra`/g().")));
    assert_eq!(graph.get_defined_symbols_along_path("pkg.sub.mod").len(), 1);
    assert!(graph.get_defined_symbols_along_path("missing").is_empty());
    Ok(())
}

#[test]
fn test_containment_is_acyclic() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.add_document(
        "m.py",
        vec![
            def("`m`/", 0, 0, 0),
            def("`m`/A#", 1, 6, 7),
            def("`m`/A#B#", 2, 10, 11),
            def("`m`/A#B#f().", 3, 12, 13),
            def("`m`/A#B#f().(x)", 3, 14, 15),
            def("`m`/A#g().", 5, 8, 9),
        ],
        vec![],
    );
    let graph = harness.graph()?;

    for symbol in graph.get_all_defined_symbols() {
        let mut seen = HashSet::new();
        let mut current = symbol;
        while let Some(parent) = graph.parent(current) {
            assert!(seen.insert(parent.clone()), "cycle through {}", parent);
            assert!(parent.is_ancestor_of(symbol));
            current = parent;
        }
    }
    assert_eq!(graph.parent(&sym("`m`/A#B#f().(x)")), Some(&sym("`m`/A#B#f().")));
    assert_eq!(graph.parent(&sym("`m`/A#")), Some(&sym("`m`/")));
    Ok(())
}

#[test]
fn test_uris_round_trip_through_graph() -> Result<()> {
    let uris = [
        uri("`a.b`/C#"),
        uri("`a.b`/C#m(+1)."),
        uri("`a.b`/C#[T]"),
        uri("`a b`/x."),
        "rust-analyzer cargo my  crate . src/lib#".to_string(),
        "local 3".to_string(),
    ];
    let mut harness = TestHarness::new()?;
    let occurrences = uris
        .iter()
        .enumerate()
        .map(|(i, u)| json!({ "symbol_uri": u, "range": [i, 0, 1], "roles": 1 }))
        .collect();
    harness.add_document("x.py", occurrences, vec![]);
    let graph = harness.graph()?;

    let loaded: Vec<String> = graph
        .get_all_defined_symbols()
        .iter()
        .map(|s| s.serialize())
        .collect();
    assert_eq!(loaded, uris.to_vec());
    Ok(())
}

#[test]
fn test_malformed_uri_is_a_load_warning() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.add_document(
        "a.py",
        vec![
            json!({ "symbol_uri": "not-a-symbol", "range": [0, 0, 1], "roles": 1 }),
            def("`a`/ok().", 1, 4, 6),
            reference("`a`/ok().", 3, 0, 2),
        ],
        vec![],
    );
    let graph = harness.graph()?;

    assert_eq!(graph.report().count(WarningStage::SymbolParse), 1);
    assert!(graph.is_defined(&sym("`a`/ok().")));
    assert_eq!(graph.references(&sym("`a`/ok().")).len(), 1);
    Ok(())
}

#[test]
fn test_duplicate_definition_keeps_first() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.add_document("one.py", vec![def("`dup`/X#", 0, 6, 7)], vec![]);
    harness.add_document("two.py", vec![def("`dup`/X#", 2, 6, 7)], vec![]);
    let graph = harness.graph()?;

    let site = graph.definition(&sym("`dup`/X#")).expect("defined");
    assert_eq!(site.file_path, "one.py");
    assert_eq!(graph.report().count(WarningStage::DuplicateDefinition), 1);
    Ok(())
}

#[test]
fn test_unreadable_index_is_fatal() -> Result<()> {
    let harness = TestHarness::new()?;
    let missing = SymbolGraph::load(&harness.path().join("nope.json"));
    assert!(matches!(missing, Err(SymbolError::IndexLoadFailure(_))));

    let garbage = harness.create_test_file("bad.json", "{ not json")?;
    assert!(matches!(
        SymbolGraph::load(&garbage),
        Err(SymbolError::IndexLoadFailure(_))
    ));
    Ok(())
}
