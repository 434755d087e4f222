use anyhow::Result;

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{def, reference};
use symbolgraph::search::QueryResult;
use symbolgraph::SymbolError;

fn project() -> Result<TestHarness> {
    let mut harness = TestHarness::new()?;
    harness.create_test_file("pkg/models.py", "class Old:\n    pass\n\nOLD = Old()\n")?;
    harness.create_test_file("pkg/views.py", "from pkg.models import Old\n\ndef show(x: Old) -> Old:\n    return x\n")?;
    harness.create_test_file("pkg/empty.py", "VALUE = 1\n")?;

    harness.add_document("pkg/models.py", vec![def("`pkg.models`/Old#", 0, 6, 9)], vec![]);
    harness.add_document(
        "pkg/views.py",
        vec![
            reference("`pkg.models`/Old#", 0, 23, 26),
            def("`pkg.views`/show().", 2, 4, 8),
        ],
        vec![],
    );
    harness.add_document("pkg/empty.py", vec![def("`pkg.empty`/VALUE.", 0, 0, 5)], vec![]);
    Ok(harness)
}

#[test]
fn test_dry_run_leaves_bytes_unchanged() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    let before: Vec<_> = ["pkg/models.py", "pkg/views.py", "pkg/empty.py"]
        .iter()
        .map(|p| harness.read(p))
        .collect::<Result<_>>()?;

    let QueryResult::Replace(report) = searcher.process_query("type:replace \"Old\" \"New\" false")? else {
        panic!("expected replace report");
    };
    assert!(!report.written);
    assert_eq!(report.counts.get("pkg/models.py"), Some(&2));
    assert_eq!(report.counts.get("pkg/views.py"), Some(&3));
    assert!(!report.counts.contains_key("pkg/empty.py"));

    let after: Vec<_> = ["pkg/models.py", "pkg/views.py", "pkg/empty.py"]
        .iter()
        .map(|p| harness.read(p))
        .collect::<Result<_>>()?;
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn test_dry_run_count_matches_write() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;

    let dry = searcher.replace("Old", "Renamed", false)?;
    let wet = searcher.replace("Old", "Renamed", true)?;
    assert_eq!(dry.counts, wet.counts);
    assert!(wet.failures.is_empty());

    for (path, count) in &wet.counts {
        let text = String::from_utf8(harness.read(path)?)?;
        assert_eq!(text.matches("Old").count(), 0, "{} still contains find", path);
        assert_eq!(text.matches("Renamed").count(), *count);
    }

    // The graph is untouched by a write
    let refs = searcher.symbol_references(&crate::helpers::test_utils::sym("`pkg.models`/Old#"));
    assert_eq!(refs.len(), 1);
    Ok(())
}

#[test]
fn test_unchanged_files_are_not_rewritten() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    let untouched = harness.path().join("pkg/empty.py");
    let modified_before = std::fs::metadata(&untouched)?.modified()?;

    searcher.replace("Old", "New", true)?;
    assert_eq!(std::fs::metadata(&untouched)?.modified()?, modified_before);
    Ok(())
}

#[test]
fn test_missing_file_fails_alone() -> Result<()> {
    let harness = project()?;
    std::fs::remove_file(harness.path().join("pkg/models.py"))?;
    let searcher = harness.searcher()?;

    let report = searcher.replace("Old", "New", true)?;
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.counts.get("pkg/views.py"), Some(&3));
    let views = String::from_utf8(harness.read("pkg/views.py")?)?;
    assert!(views.contains("def show(x: New) -> New:"));
    Ok(())
}

#[test]
fn test_empty_find_is_rejected() -> Result<()> {
    let harness = project()?;
    let searcher = harness.searcher()?;
    assert!(matches!(
        searcher.replace("", "x", true),
        Err(SymbolError::MalformedQuery { .. })
    ));
    Ok(())
}
