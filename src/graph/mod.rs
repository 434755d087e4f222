//! Symbol graph: definitions, references and containment over an index
//!
//! The graph is built exactly once from loaded index data and is read-only
//! afterwards, so a shared `Arc<SymbolGraph>` can serve any number of
//! concurrent queries without locking.

mod containment;
mod context;
mod scope;

pub use context::{DefinitionSite, SymbolContext};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{info, warn};

use crate::index::{
    load_index, module_is_under, File, IndexData, LoadReport, Occurrence, Relationship,
    SymbolInformation, WarningCollector, WarningStage,
};
use crate::metrics;
use crate::symbol::{Symbol, SymbolError, SymbolResult};
use scope::ScopeIndex;

/// In-memory relational view over all indexed files
pub struct SymbolGraph {
    files: Vec<File>,
    file_lookup: HashMap<String, usize>,
    /// Defined symbols in file order
    defined: Vec<Symbol>,
    defines: HashMap<Symbol, DefinitionSite>,
    references: HashMap<Symbol, Vec<Occurrence>>,
    info: HashMap<Symbol, SymbolInformation>,
    parents: HashMap<Symbol, Symbol>,
    children: HashMap<Symbol, BTreeSet<Symbol>>,
    scopes: ScopeIndex,
    report: LoadReport,
}

impl SymbolGraph {
    /// Load an index file and build the graph from it
    pub fn load(index_path: &Path) -> SymbolResult<Self> {
        Self::build(load_index(index_path)?)
    }

    /// Build the graph from loaded index data.
    ///
    /// Duplicate definitions and ambiguous containers are recorded as
    /// warnings (first seen wins); a containment cycle fails the build.
    pub fn build(data: IndexData) -> SymbolResult<Self> {
        let IndexData { files, report } = data;
        let mut warnings = WarningCollector::new();
        warnings.extend(report.warnings);

        let mut file_lookup = HashMap::new();
        let mut defined_with_path: Vec<(Symbol, String)> = Vec::new();
        let mut defines: HashMap<Symbol, DefinitionSite> = HashMap::new();
        let mut references: HashMap<Symbol, Vec<Occurrence>> = HashMap::new();
        let mut info: HashMap<Symbol, SymbolInformation> = HashMap::new();
        let mut scopes = ScopeIndex::default();

        for (idx, file) in files.iter().enumerate() {
            file_lookup.entry(file.path.clone()).or_insert(idx);

            for occurrence in &file.occurrences {
                if !occurrence.is_definition() {
                    references
                        .entry(occurrence.symbol.clone())
                        .or_default()
                        .push(occurrence.clone());
                    continue;
                }

                if let Some(first) = defines.get(&occurrence.symbol) {
                    let err = SymbolError::DuplicateDefinition {
                        symbol: occurrence.symbol.to_string(),
                        path: file.path.clone(),
                        first_path: first.file_path.clone(),
                    };
                    warn!("{}", err);
                    warnings.record(&file.path, err, WarningStage::DuplicateDefinition);
                    continue;
                }

                defines.insert(
                    occurrence.symbol.clone(),
                    DefinitionSite {
                        file_path: file.path.clone(),
                        range: occurrence.range,
                        enclosing_range: occurrence.enclosing_range,
                    },
                );
                scopes.add(
                    &file.path,
                    occurrence.symbol.clone(),
                    occurrence.range,
                    occurrence.enclosing_range,
                );
                defined_with_path.push((occurrence.symbol.clone(), file.path.clone()));
            }

            for information in &file.symbols {
                info.entry(information.symbol.clone())
                    .or_insert_with(|| information.clone());
            }
        }
        scopes.finish();

        let parents = containment::resolve_containers(&defined_with_path, &mut warnings);
        containment::ensure_acyclic(&parents)?;

        let mut children: HashMap<Symbol, BTreeSet<Symbol>> = HashMap::new();
        for (child, parent) in &parents {
            children
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
        }

        let report = warnings.into_report();
        let graph = Self {
            files,
            file_lookup,
            defined: defined_with_path.into_iter().map(|(s, _)| s).collect(),
            defines,
            references,
            info,
            parents,
            children,
            scopes,
            report,
        };

        metrics::GRAPH_FILES.set(graph.files.len() as f64);
        metrics::GRAPH_SYMBOLS.set(graph.defined.len() as f64);
        info!(
            "Built symbol graph with {} defined symbols across {} files ({})",
            graph.defined.len(),
            graph.files.len(),
            graph.report.summary
        );

        Ok(graph)
    }

    /// All files, in the order of the source index
    pub fn get_all_files(&self) -> &[File] {
        &self.files
    }

    /// Indexed file by its relative path
    pub fn file(&self, path: &str) -> Option<&File> {
        self.file_lookup.get(path).map(|&idx| &self.files[idx])
    }

    /// All defined symbols, in file order
    pub fn get_all_defined_symbols(&self) -> &[Symbol] {
        &self.defined
    }

    /// Every non-local symbol defined in a file whose module path equals or
    /// is nested under `module_path`
    pub fn get_defined_symbols_along_path(&self, module_path: &str) -> BTreeSet<Symbol> {
        let module_path = module_path.trim().trim_end_matches('.');
        let mut symbols = BTreeSet::new();
        for file in &self.files {
            if !module_is_under(&file.module_path(), module_path) {
                continue;
            }
            for occurrence in file.occurrences.iter().filter(|o| o.is_definition()) {
                if occurrence.symbol.is_local() {
                    continue;
                }
                let defined_here = self
                    .defines
                    .get(&occurrence.symbol)
                    .is_some_and(|site| site.file_path == file.path);
                if defined_here {
                    symbols.insert(occurrence.symbol.clone());
                }
            }
        }
        symbols
    }

    /// Summarize a symbol's definition, documentation, containment and usage
    pub fn get_symbol_context(&self, symbol: &Symbol) -> SymbolResult<SymbolContext> {
        let definition = self.defines.get(symbol);
        let references = self.references(symbol);
        if definition.is_none() && references.is_empty() {
            return Err(SymbolError::SymbolNotFound(symbol.to_string()));
        }

        let information = self.info.get(symbol);
        Ok(SymbolContext {
            symbol: symbol.clone(),
            definition_file: definition.map(|d| d.file_path.clone()),
            definition_range: definition.map(|d| d.range),
            documentation: information.and_then(|i| i.documentation.clone()),
            immediate_container: self.parents.get(symbol).cloned(),
            direct_children: self.children.get(symbol).cloned().unwrap_or_default(),
            reference_count: references.len(),
            relationships: information
                .map(|i| i.relationships.clone())
                .unwrap_or_default(),
        })
    }

    /// All non-definition occurrences of `symbol`, empty when there are none
    pub fn references(&self, symbol: &Symbol) -> &[Occurrence] {
        self.references
            .get(symbol)
            .map(|refs| refs.as_slice())
            .unwrap_or(&[])
    }

    /// References grouped by file path
    pub fn references_by_file(&self, symbol: &Symbol) -> BTreeMap<String, Vec<Occurrence>> {
        let mut grouped: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for occurrence in self.references(symbol) {
            grouped
                .entry(occurrence.file_path.clone())
                .or_default()
                .push(occurrence.clone());
        }
        grouped
    }

    /// Symbols that are referenced anywhere, defined or not
    pub fn referenced_symbols(&self) -> impl Iterator<Item = (&Symbol, &[Occurrence])> {
        self.references
            .iter()
            .map(|(symbol, refs)| (symbol, refs.as_slice()))
    }

    /// Where the symbol is defined, if the index defines it
    pub fn definition(&self, symbol: &Symbol) -> Option<&DefinitionSite> {
        self.defines.get(symbol)
    }

    /// Whether any file in the index defines the symbol
    pub fn is_defined(&self, symbol: &Symbol) -> bool {
        self.defines.contains_key(symbol)
    }

    /// Documentation attached to the symbol's information record
    pub fn documentation(&self, symbol: &Symbol) -> Option<&str> {
        self.info
            .get(symbol)
            .and_then(|i| i.documentation.as_deref())
    }

    /// Declared relationships of the symbol; empty when it has none
    pub fn get_symbol_relationships(&self, symbol: &Symbol) -> &[Relationship] {
        self.info
            .get(symbol)
            .map(|i| i.relationships.as_slice())
            .unwrap_or(&[])
    }

    /// Nearest defined container of the symbol
    pub fn parent(&self, symbol: &Symbol) -> Option<&Symbol> {
        self.parents.get(symbol)
    }

    /// Symbols whose nearest defined container is `symbol`
    pub fn children(&self, symbol: &Symbol) -> impl Iterator<Item = &Symbol> {
        self.children.get(symbol).into_iter().flatten()
    }

    /// Defined symbol whose scope encloses the given file position
    pub fn scope_owner(&self, file_path: &str, line: u32, col: u32) -> Option<&Symbol> {
        self.scopes.owner(file_path, line, col)
    }

    /// Warnings raised while loading and building
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
