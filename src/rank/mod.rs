//! Symbol importance ranking by iterative propagation over references
//!
//! An edge `u -> v` exists when `v` is referenced from inside the defining
//! scope of `u`, weighted by the number of such references. Scores are the
//! stationary distribution of a damped random walk over these edges, with
//! the teleport vector optionally concentrated on symbols matching a query.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::graph::SymbolGraph;
use crate::metrics;
use crate::symbol::{SuffixKind, Symbol, SymbolError, SymbolResult};

/// Parameters of the power iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    /// Probability of following an edge rather than teleporting
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Stop once the L1 change between iterations drops below this value
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Hard cap on the number of iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Symbol count above which each update runs on the rayon pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_damping() -> f64 {
    0.85
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

fn default_parallel_threshold() -> usize {
    2048
}

/// Weighted reference graph over rankable symbols, indexed by URI order
struct RankGraph {
    symbols: Vec<Symbol>,
    /// Incoming edges per target as `(source, weight)`, sorted by source
    incoming: Vec<Vec<(usize, f64)>>,
    out_weight: Vec<f64>,
}

impl RankGraph {
    fn build(graph: &SymbolGraph) -> Self {
        let mut candidates: BTreeSet<&Symbol> = graph
            .get_all_defined_symbols()
            .iter()
            .filter(|s| is_rankable(s))
            .collect();
        candidates.extend(graph.referenced_symbols().map(|(s, _)| s).filter(|s| is_rankable(s)));

        let symbols: Vec<Symbol> = candidates.into_iter().cloned().collect();
        let position: HashMap<&Symbol, usize> =
            symbols.iter().enumerate().map(|(i, s)| (s, i)).collect();

        // BTreeMap keeps the summation order stable between runs
        let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (target, occurrences) in graph.referenced_symbols() {
            let Some(&v) = position.get(target) else {
                continue;
            };
            for occurrence in occurrences {
                let owner = graph.scope_owner(
                    &occurrence.file_path,
                    occurrence.range.start_line,
                    occurrence.range.start_col,
                );
                let Some(&u) = owner.and_then(|o| position.get(o)) else {
                    continue;
                };
                if u != v {
                    *weights.entry((u, v)).or_insert(0.0) += 1.0;
                }
            }
        }

        let n = symbols.len();
        let mut incoming = vec![Vec::new(); n];
        let mut out_weight = vec![0.0; n];
        for (&(u, v), &w) in &weights {
            incoming[v].push((u, w));
            out_weight[u] += w;
        }
        for edges in &mut incoming {
            edges.sort_by_key(|&(u, _)| u);
        }

        debug!("Rank graph has {} symbols and {} edges", n, weights.len());

        Self {
            symbols,
            incoming,
            out_weight,
        }
    }

    fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Indices of symbols whose URI or documentation contains `query`
    fn seeds(&self, graph: &SymbolGraph, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.uri().to_lowercase().contains(&needle)
                    || graph
                        .documentation(s)
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn teleport(&self, seeds: &[usize]) -> Vec<f64> {
        let n = self.len();
        if seeds.is_empty() {
            return vec![1.0 / n as f64; n];
        }
        let mut teleport = vec![0.0; n];
        let share = 1.0 / seeds.len() as f64;
        for &i in seeds {
            teleport[i] = share;
        }
        teleport
    }

    /// One damped propagation step; dangling mass is redistributed through
    /// the teleport vector so the total stays constant.
    fn step(&self, ranks: &[f64], teleport: &[f64], damping: f64, parallel: bool) -> Vec<f64> {
        let dangling: f64 = ranks
            .iter()
            .zip(&self.out_weight)
            .filter(|(_, &w)| w == 0.0)
            .map(|(r, _)| r)
            .sum();

        let update = |v: usize| -> f64 {
            let inflow: f64 = self.incoming[v]
                .iter()
                .map(|&(u, w)| ranks[u] * w / self.out_weight[u])
                .sum();
            (1.0 - damping) * teleport[v] + damping * (inflow + dangling * teleport[v])
        };

        if parallel {
            (0..self.len()).into_par_iter().map(update).collect()
        } else {
            (0..self.len()).map(update).collect()
        }
    }
}

fn is_rankable(symbol: &Symbol) -> bool {
    !symbol.is_local()
        && !matches!(
            symbol.kind(),
            Some(SuffixKind::Parameter | SuffixKind::TypeParameter)
        )
}

fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Ranks symbols of a graph with a fixed configuration
pub struct SymbolRank<'a> {
    graph: &'a SymbolGraph,
    config: RankConfig,
}

impl<'a> SymbolRank<'a> {
    pub fn new(graph: &'a SymbolGraph, config: RankConfig) -> Self {
        Self { graph, config }
    }

    /// Rank symbols for `query`, descending by score with ties broken by URI.
    ///
    /// An empty query (or one matching nothing) yields the global ranking.
    pub fn rank(&self, query: &str) -> Vec<(Symbol, f64)> {
        match self.rank_with_cancel(query, &CancellationToken::new()) {
            Ok(ranked) => ranked,
            // A fresh token is never cancelled
            Err(_) => Vec::new(),
        }
    }

    /// Like [`SymbolRank::rank`], checking `cancel` between iterations.
    ///
    /// Once cancelled, no partial scores are returned.
    pub fn rank_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> SymbolResult<Vec<(Symbol, f64)>> {
        let start = Instant::now();
        let rank_graph = RankGraph::build(self.graph);
        let n = rank_graph.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let seeds = rank_graph.seeds(self.graph, query);
        let teleport = rank_graph.teleport(&seeds);
        let parallel = n >= self.config.parallel_threshold;

        let mut ranks = vec![1.0 / n as f64; n];
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.config.max_iterations {
            if cancel.is_cancelled() {
                return Err(SymbolError::Cancelled);
            }
            let next = rank_graph.step(&ranks, &teleport, self.config.damping, parallel);
            let delta = l1_distance(&next, &ranks);
            ranks = next;
            iterations += 1;
            if delta < self.config.tolerance {
                converged = true;
                break;
            }
        }

        metrics::RANK_ITERATIONS.observe(iterations as f64);
        debug!(
            "Symbol rank for '{}' finished after {} iterations (converged: {}) in {:.3}s",
            query,
            iterations,
            converged,
            start.elapsed().as_secs_f64()
        );

        let mut ranked: Vec<(Symbol, f64)> = if seeds.is_empty() {
            rank_graph.symbols.into_iter().zip(ranks).collect()
        } else {
            seeds
                .iter()
                .map(|&i| (rank_graph.symbols[i].clone(), ranks[i]))
                .collect()
        };
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }
}
