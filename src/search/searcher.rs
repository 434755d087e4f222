//! Single entry point for typed queries over a symbol graph

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::exact::{ExactSearch, ExactSearchResult, ReplaceReport};
use super::query::Query;
use super::source::SourceProvider;
use crate::config::SearchConfig;
use crate::graph::SymbolGraph;
use crate::index::Occurrence;
use crate::metrics;
use crate::rank::{RankConfig, SymbolRank};
use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// Result of [`SymbolSearcher::process_query`], one variant per query type
#[derive(Debug)]
pub enum QueryResult {
    /// References grouped by file path
    References(BTreeMap<String, Vec<Occurrence>>),
    /// Definition source, `None` for external symbols
    Source(Option<String>),
    Exact(ExactSearchResult),
    Replace(ReplaceReport),
}

/// A ranked symbol as returned by [`SymbolSearcher::symbol_rank_search`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSymbol {
    pub symbol: Symbol,
    pub score: f64,
}

/// Routes queries to the graph, the ranker and exact search.
///
/// Holds no state besides shared handles, so clones are cheap and may be
/// used from any number of threads.
#[derive(Clone)]
pub struct SymbolSearcher {
    graph: Arc<SymbolGraph>,
    provider: Arc<dyn SourceProvider>,
    rank_config: RankConfig,
    search_config: SearchConfig,
}

impl SymbolSearcher {
    pub fn new(graph: Arc<SymbolGraph>, provider: Arc<dyn SourceProvider>) -> Self {
        Self {
            graph,
            provider,
            rank_config: RankConfig::default(),
            search_config: SearchConfig::default(),
        }
    }

    pub fn with_rank_config(mut self, config: RankConfig) -> Self {
        self.rank_config = config;
        self
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn graph(&self) -> &SymbolGraph {
        &self.graph
    }

    /// Parse and run a textual query such as `type:exact "foo"`
    pub fn process_query(&self, query: &str) -> SymbolResult<QueryResult> {
        let start = Instant::now();
        metrics::QUERY_REQUESTS.inc();

        let result = Query::parse(query).and_then(|q| self.run(q));

        metrics::QUERY_LATENCY.observe(start.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics::QUERY_ERRORS.inc();
            debug!("Query '{}' failed: {}", query, e);
        }
        result
    }

    /// Run an already parsed query
    pub fn run(&self, query: Query) -> SymbolResult<QueryResult> {
        match query {
            Query::Symbol(symbol) => Ok(QueryResult::References(self.symbol_references(&symbol))),
            Query::Source(symbol) => self
                .retrieve_source_code_by_symbol(&symbol)
                .map(QueryResult::Source),
            Query::Exact(pattern) => self.exact_search(&pattern).map(QueryResult::Exact),
            Query::Replace {
                find,
                replace_with,
                do_write,
            } => self
                .replace(&find, &replace_with, do_write)
                .map(QueryResult::Replace),
        }
    }

    /// References of `symbol` grouped by file; empty for unknown symbols
    pub fn symbol_references(&self, symbol: &Symbol) -> BTreeMap<String, Vec<Occurrence>> {
        self.graph.references_by_file(symbol)
    }

    /// Source text of the symbol's definition.
    ///
    /// `Ok(None)` for symbols that are only referenced (defined outside the
    /// index); `SymbolNotFound` when the graph has never seen the symbol.
    pub fn retrieve_source_code_by_symbol(&self, symbol: &Symbol) -> SymbolResult<Option<String>> {
        match self.graph.definition(symbol) {
            Some(site) => self.provider.get_definition_text(symbol, site).map(Some),
            None if !self.graph.references(symbol).is_empty() => Ok(None),
            None => Err(SymbolError::SymbolNotFound(symbol.to_string())),
        }
    }

    /// Literal matches of `pattern` across every indexed file
    pub fn exact_search(&self, pattern: &str) -> SymbolResult<ExactSearchResult> {
        self.exact_search_with_cancel(pattern, &CancellationToken::new())
    }

    /// Exact search that returns `Cancelled` once the token fires
    pub fn exact_search_with_cancel(
        &self,
        pattern: &str,
        cancel: &CancellationToken,
    ) -> SymbolResult<ExactSearchResult> {
        self.exact().search_with_cancel(pattern, cancel)
    }

    /// Literal find and replace over every indexed file.
    ///
    /// The graph is not updated; reload the index to see the effect of a
    /// write. Concurrent replaces touching the same file must be serialized
    /// by the caller.
    pub fn replace(
        &self,
        find: &str,
        replace_with: &str,
        do_write: bool,
    ) -> SymbolResult<ReplaceReport> {
        self.exact().replace(find, replace_with, do_write)
    }

    /// Top symbols by rank for `query`, limited to the configured count
    pub fn symbol_rank_search(&self, query: &str) -> Vec<RankedSymbol> {
        self.rank(query)
            .into_iter()
            .take(self.search_config.default_rank_limit)
            .collect()
    }

    /// Like [`Self::symbol_rank_search`], stopping early on cancellation
    pub fn symbol_rank_search_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> SymbolResult<Vec<RankedSymbol>> {
        let ranked = SymbolRank::new(&self.graph, self.rank_config.clone())
            .rank_with_cancel(query, cancel)?;
        Ok(ranked
            .into_iter()
            .take(self.search_config.default_rank_limit)
            .map(|(symbol, score)| RankedSymbol { symbol, score })
            .collect())
    }

    /// Full ranking for `query`, without the result limit
    pub fn rank(&self, query: &str) -> Vec<RankedSymbol> {
        SymbolRank::new(&self.graph, self.rank_config.clone())
            .rank(query)
            .into_iter()
            .map(|(symbol, score)| RankedSymbol { symbol, score })
            .collect()
    }

    fn exact(&self) -> ExactSearch<'_> {
        ExactSearch::new(&self.graph, self.provider.as_ref())
            .with_max_matches_per_file(self.search_config.max_exact_matches_per_file)
    }
}
