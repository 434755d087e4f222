use anyhow::Result;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use symbolgraph::search::{FsSourceProvider, SymbolSearcher};
use symbolgraph::SymbolGraph;

/// A temporary project with source files and a JSON index describing them
pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: symbolgraph::Config,
    documents: Vec<Value>,
}

impl TestHarness {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            config: symbolgraph::Config::default(),
            documents: Vec::new(),
        })
    }

    pub fn create_test_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    /// Add a document to the index
    pub fn add_document(&mut self, path: &str, occurrences: Vec<Value>, symbols: Vec<Value>) {
        self.documents.push(json!({
            "relative_path": path,
            "occurrences": occurrences,
            "symbols": symbols,
        }));
    }

    /// Write `index.json` into the project and return its path
    pub fn write_index(&self) -> Result<PathBuf> {
        let index_path = self.temp_dir.path().join("index.json");
        let index = json!({ "metadata": { "tool": "test" }, "documents": self.documents });
        std::fs::write(&index_path, serde_json::to_string_pretty(&index)?)?;
        Ok(index_path)
    }

    pub fn graph(&self) -> Result<SymbolGraph> {
        Ok(SymbolGraph::load(&self.write_index()?)?)
    }

    pub fn searcher(&self) -> Result<SymbolSearcher> {
        let graph = Arc::new(self.graph()?);
        let provider = Arc::new(FsSourceProvider::new(self.path()));
        Ok(SymbolSearcher::new(graph, provider)
            .with_rank_config(self.config.rank.clone())
            .with_search_config(self.config.search.clone()))
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.temp_dir.path().join(path))?)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
