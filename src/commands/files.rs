use anyhow::Result;

use super::Workspace;

/// Run the files command
pub fn run(workspace: &Workspace) -> Result<()> {
    let files = workspace.graph.get_all_files();
    if files.is_empty() {
        println!("The index contains no files.");
        return Ok(());
    }

    println!("Indexed files ({} files):", files.len());
    for file in files {
        let definitions = file.occurrences.iter().filter(|o| o.is_definition()).count();
        println!(
            "  {}  ({} occurrences, {} definitions)",
            file.path,
            file.occurrences.len(),
            definitions
        );
    }
    Ok(())
}
