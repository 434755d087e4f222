use anyhow::Result;

use super::Workspace;

/// Run the rank command
pub fn run(workspace: &Workspace, query: Option<&str>, limit: Option<usize>) -> Result<()> {
    let query = query.unwrap_or("");
    let limit = limit.unwrap_or(workspace.config.search.default_rank_limit);
    let ranked = workspace.searcher().rank(query);

    if ranked.is_empty() {
        println!("No symbols to rank.");
        return Ok(());
    }

    if query.is_empty() {
        println!("Top {} of {} symbols:", limit.min(ranked.len()), ranked.len());
    } else {
        println!(
            "Top {} of {} symbols for \"{}\":",
            limit.min(ranked.len()),
            ranked.len(),
            query
        );
    }
    for (i, entry) in ranked.iter().take(limit).enumerate() {
        println!("{:>4}. {:.6}  {}", i + 1, entry.score, entry.symbol);
    }
    Ok(())
}
