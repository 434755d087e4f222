use anyhow::Result;
use std::thread;

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{def, def_enclosing, info, reference, sym, uri, PREFIX};
use symbolgraph::search::{Attribution, QueryResult};
use symbolgraph::tools::{AgentTool, SearchTool, SymbolSearchTool};
use symbolgraph::SymbolError;

/// Two files: `one.py` mentions foo twice inside `run`, `two.py` not at all
fn project() -> Result<TestHarness> {
    let mut harness = TestHarness::new()?;
    harness.create_test_file(
        "one.py",
        "import two\n\ndef run():\n    foo = two.helper()\n    return foo\n",
    )?;
    harness.create_test_file("two.py", "def helper():\n    \"\"\"Return a value.\"\"\"\n    return 42\n")?;

    harness.add_document(
        "one.py",
        vec![
            def_enclosing("`one`/run().", 2, 4, 7, [2, 0, 5, 0]),
            reference("`two`/helper().", 3, 14, 20),
        ],
        vec![],
    );
    harness.add_document(
        "two.py",
        vec![def("`two`/helper().", 0, 4, 10)],
        vec![info("`two`/helper().", "Return a value.")],
    );
    Ok(harness)
}

#[test]
fn test_exact_query_returns_one_file_key() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    let result = searcher.process_query("type:exact \"foo\"")?;
    let QueryResult::Exact(result) = result else {
        panic!("expected exact search result");
    };

    assert_eq!(result.matches.len(), 1);
    let matches = &result.matches["one.py"];
    assert_eq!(matches.len(), 2);
    assert!(matches
        .iter()
        .all(|m| m.attribution == Attribution::Symbol(sym("`one`/run()."))));
    assert_eq!(result.by_symbol().len(), 1);
    Ok(())
}

#[test]
fn test_symbol_query_lists_references() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    let result = searcher.process_query(&format!("type:symbol {}", uri("`two`/helper().")))?;
    let QueryResult::References(by_file) = result else {
        panic!("expected references");
    };
    assert_eq!(by_file.keys().collect::<Vec<_>>(), vec!["one.py"]);
    assert_eq!(by_file["one.py"][0].range.start_col, 14);
    Ok(())
}

#[test]
fn test_source_query_returns_definition_block() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    let result = searcher.process_query(&format!("type:source {}", uri("`two`/helper().")))?;
    let QueryResult::Source(Some(text)) = result else {
        panic!("expected source text");
    };
    assert!(text.starts_with("def helper():"));
    assert!(text.ends_with("return 42"));
    Ok(())
}

#[test]
fn test_malformed_uri_is_reported() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    assert!(matches!(
        symbolgraph::Symbol::parse("not-a-symbol"),
        Err(SymbolError::MalformedSymbolUri { .. })
    ));
    let result = searcher.process_query("type:symbol not-a-symbol");
    assert!(matches!(result, Err(SymbolError::MalformedSymbolUri { .. })));

    // The searcher stays usable afterwards
    assert!(searcher.process_query("type:exact foo").is_ok());
    Ok(())
}

#[test]
fn test_unsupported_and_malformed_queries() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    assert!(matches!(
        searcher.process_query("type:regex fo+"),
        Err(SymbolError::UnsupportedQueryType(_))
    ));
    assert!(matches!(
        searcher.process_query("type:source"),
        Err(SymbolError::MalformedQuery { .. })
    ));
    Ok(())
}

#[test]
fn test_rank_is_deterministic_and_query_focused() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    let first = searcher.rank("");
    let second = searcher.rank("");
    assert_eq!(first, second);
    assert_eq!(first[0].symbol, sym("`two`/helper()."));

    let focused = searcher.symbol_rank_search("return a VALUE");
    assert_eq!(focused.len(), 1);
    assert_eq!(focused[0].symbol, sym("`two`/helper()."));
    Ok(())
}

#[test]
fn test_concurrent_queries_share_one_graph() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    let helper = uri("`two`/helper().");

    thread::scope(|scope| {
        for _ in 0..4 {
            let searcher = searcher.clone();
            let helper = helper.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    let refs = searcher.symbol_references(&symbolgraph::Symbol::parse(&helper).unwrap());
                    assert_eq!(refs.len(), 1);
                    assert_eq!(searcher.exact_search("foo").unwrap().total_matches(), 2);
                }
            });
        }
    });
    Ok(())
}

#[test]
fn test_agent_tools_never_fail() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    let tools = SymbolSearchTool::new(searcher).build();
    assert_eq!(tools.len(), SearchTool::ALL.len());

    for tool in &tools {
        let output = tool.run("definitely not a symbol");
        assert!(!output.is_empty(), "{} returned nothing", tool.name);
    }

    let references = tools
        .iter()
        .find(|t| t.name == "symbol-references")
        .expect("references tool");
    assert!(references
        .run(&format!("{} `two`/helper().", PREFIX))
        .starts_with("one.py:3:14"));
    Ok(())
}
