use anyhow::{Context, Result};

use super::Workspace;
use crate::symbol::Symbol;

/// Run the context command
pub fn run(workspace: &Workspace, uri: &str) -> Result<()> {
    let symbol = Symbol::parse(uri.trim()).context("Invalid symbol URI")?;
    let context = workspace.graph.get_symbol_context(&symbol)?;
    print!("{}", context);
    Ok(())
}
