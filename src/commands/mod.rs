//! CLI command implementations

pub mod context;
pub mod files;
pub mod query;
pub mod rank;
pub mod stats;
pub mod symbols;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::graph::SymbolGraph;
use crate::search::{FsSourceProvider, SymbolSearcher};
use crate::Config;

/// A loaded graph together with the configuration it is queried with
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub graph: Arc<SymbolGraph>,
}

impl Workspace {
    /// Load the index and print a summary of any load warnings
    pub fn open(index: &Path, root: &Path, config: Config) -> Result<Self> {
        let graph = SymbolGraph::load(index)
            .with_context(|| format!("Failed to load index {}", index.display()))?;

        if graph.report().has_warnings() {
            graph.report().print_summary();
        }

        Ok(Self {
            root: root.to_path_buf(),
            config,
            graph: Arc::new(graph),
        })
    }

    pub fn searcher(&self) -> SymbolSearcher {
        let provider = FsSourceProvider::new(self.config.source_root(&self.root));
        SymbolSearcher::new(Arc::clone(&self.graph), Arc::new(provider))
            .with_rank_config(self.config.rank.clone())
            .with_search_config(self.config.search.clone())
    }
}
