use anyhow::Result;

use super::Workspace;

/// Run the symbols command
pub fn run(workspace: &Workspace, module_path: &str) -> Result<()> {
    let symbols = workspace.graph.get_defined_symbols_along_path(module_path);
    if symbols.is_empty() {
        println!("No symbols defined under '{}'.", module_path);
        return Ok(());
    }

    println!("Symbols under '{}' ({}):", module_path, symbols.len());
    for symbol in &symbols {
        let kind = symbol.kind().map(|k| k.as_str()).unwrap_or("?");
        println!("  [{}] {}", kind, symbol);
    }
    Ok(())
}
