use anyhow::Result;

use super::Workspace;
use crate::search::QueryResult;

/// Run the query command
///
/// Query errors are printed rather than returned so the exit status only
/// reflects failures to load the index.
pub fn run(workspace: &Workspace, query: &str) -> Result<()> {
    match workspace.searcher().process_query(query) {
        Ok(result) => println!("{}", render(&result)),
        Err(e) => eprintln!("Query failed: {}", e),
    }
    Ok(())
}

/// Format a query result for the terminal
pub fn render(result: &QueryResult) -> String {
    let mut output = String::new();
    match result {
        QueryResult::References(by_file) if by_file.is_empty() => {
            output.push_str("No references found.");
        }
        QueryResult::References(by_file) => {
            let total: usize = by_file.values().map(Vec::len).sum();
            output.push_str(&format!(
                "Found {} reference(s) in {} file(s)\n",
                total,
                by_file.len()
            ));
            for (path, occurrences) in by_file {
                output.push_str(&format!("\n{}\n", path));
                for occurrence in occurrences {
                    output.push_str(&format!("  {} ({})\n", occurrence.range, occurrence.roles));
                }
            }
        }
        QueryResult::Source(Some(source)) => output.push_str(source),
        QueryResult::Source(None) => output.push_str("No Result Found"),
        QueryResult::Exact(result) if result.is_empty() => output.push_str("No matches found."),
        QueryResult::Exact(result) => {
            output.push_str(&format!(
                "Found {} match(es) in {} file(s)\n",
                result.total_matches(),
                result.matches.len()
            ));
            for (path, matches) in &result.matches {
                output.push_str(&format!("\n{}\n", path));
                for m in matches {
                    output.push_str(&format!(
                        "  {}:{}  {}  [{}]\n",
                        m.line,
                        m.column,
                        m.line_text.trim(),
                        m.attribution
                    ));
                }
            }
        }
        QueryResult::Replace(report) => {
            let verb = if report.written { "Replaced" } else { "Would replace" };
            output.push_str(&format!(
                "{} {} occurrence(s) in {} file(s)\n",
                verb,
                report.total(),
                report.counts.len()
            ));
            for (path, count) in &report.counts {
                output.push_str(&format!("  {}: {}\n", path, count));
            }
            for failure in &report.failures {
                output.push_str(&format!("  failed: {}\n", failure));
            }
        }
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ReplaceReport;

    #[test]
    fn test_render_dry_run_replace() {
        let mut report = ReplaceReport::default();
        report.counts.insert("a.py".to_string(), 2);
        let text = render(&QueryResult::Replace(report));
        assert_eq!(text, "Would replace 2 occurrence(s) in 1 file(s)\n  a.py: 2");
    }

    #[test]
    fn test_render_missing_source() {
        assert_eq!(render(&QueryResult::Source(None)), "No Result Found");
    }
}
