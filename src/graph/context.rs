//! Context summary of a single symbol

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::index::{Range, Relationship};
use crate::symbol::Symbol;

/// Where a symbol is defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionSite {
    pub file_path: String,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_range: Option<Range>,
}

/// Everything the graph knows about one symbol
#[derive(Debug, Clone, Serialize)]
pub struct SymbolContext {
    pub symbol: Symbol,
    /// `None` for external symbols that are only referenced
    pub definition_file: Option<String>,
    pub definition_range: Option<Range>,
    pub documentation: Option<String>,
    pub immediate_container: Option<Symbol>,
    pub direct_children: BTreeSet<Symbol>,
    pub reference_count: usize,
    pub relationships: Vec<Relationship>,
}

impl SymbolContext {
    pub fn is_external(&self) -> bool {
        self.definition_file.is_none()
    }
}

impl fmt::Display for SymbolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol: {}", self.symbol)?;
        match (&self.definition_file, &self.definition_range) {
            (Some(file), Some(range)) => writeln!(f, "Defined in: {} at {}", file, range)?,
            _ => writeln!(f, "Defined in: <external>")?,
        }
        if let Some(container) = &self.immediate_container {
            writeln!(f, "Container: {}", container)?;
        }
        if !self.direct_children.is_empty() {
            writeln!(f, "Children:")?;
            for child in &self.direct_children {
                writeln!(f, "  - {}", child)?;
            }
        }
        if !self.relationships.is_empty() {
            writeln!(f, "Relationships:")?;
            for rel in &self.relationships {
                writeln!(f, "  - {} {}", rel.kind, rel.symbol)?;
            }
        }
        writeln!(f, "References: {}", self.reference_count)?;
        if let Some(doc) = &self.documentation {
            writeln!(f, "Documentation:")?;
            for line in doc.lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}
