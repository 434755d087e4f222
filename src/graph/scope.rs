//! Attribution of positions to the defining scope that encloses them

use std::collections::HashMap;

use crate::index::Range;
use crate::symbol::{SuffixKind, Symbol};

struct ScopeEntry {
    symbol: Symbol,
    start: (u32, u32),
    enclosing: Option<Range>,
}

/// Per-file list of scope-owning definitions, sorted by position
#[derive(Default)]
pub struct ScopeIndex {
    by_file: HashMap<String, Vec<ScopeEntry>>,
}

impl ScopeIndex {
    /// Parameters, type parameters and locals live inside another scope and
    /// never own references themselves.
    pub fn owns_scope(symbol: &Symbol) -> bool {
        !symbol.is_local()
            && !matches!(
                symbol.kind(),
                Some(SuffixKind::Parameter | SuffixKind::TypeParameter | SuffixKind::Local)
            )
    }

    pub fn add(&mut self, file_path: &str, symbol: Symbol, range: Range, enclosing: Option<Range>) {
        if !Self::owns_scope(&symbol) {
            return;
        }
        self.by_file
            .entry(file_path.to_string())
            .or_default()
            .push(ScopeEntry {
                symbol,
                start: range.start(),
                enclosing,
            });
    }

    pub fn finish(&mut self) {
        for entries in self.by_file.values_mut() {
            entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.symbol.cmp(&b.symbol)));
        }
    }

    /// Innermost definition whose scope encloses `(line, col)`.
    ///
    /// Enclosing ranges are used when the index provides them; otherwise the
    /// closest preceding definition in the file owns the position.
    pub fn owner(&self, file_path: &str, line: u32, col: u32) -> Option<&Symbol> {
        let entries = self.by_file.get(file_path)?;
        let pos = (line, col);

        let enclosing = entries
            .iter()
            .filter(|e| e.enclosing.is_some_and(|r| r.contains(line, col)))
            .max_by(|a, b| {
                a.start
                    .cmp(&b.start)
                    .then_with(|| a.symbol.descriptors().len().cmp(&b.symbol.descriptors().len()))
            });
        if let Some(entry) = enclosing {
            return Some(&entry.symbol);
        }

        entries
            .iter()
            .rev()
            .filter(|e| e.enclosing.is_none())
            .find(|e| e.start <= pos)
            .map(|e| &e.symbol)
    }
}
