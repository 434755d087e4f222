//! Prometheus metrics for symbolgraph
//!
//! Counters and histograms for query processing, ranking and search, plus
//! gauges describing the loaded graph.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Query metrics
    // ============================================================================

    /// Total number of queries processed by the searcher
    pub static ref QUERY_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "symbolgraph_query_requests_total",
            "Total number of queries processed"
        )
    ).expect("Failed to create QUERY_REQUESTS counter");

    /// Queries that ended in an error
    pub static ref QUERY_ERRORS: Counter = Counter::with_opts(
        Opts::new(
            "symbolgraph_query_errors_total",
            "Total number of queries that failed"
        )
    ).expect("Failed to create QUERY_ERRORS counter");

    /// Query latency in seconds
    pub static ref QUERY_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "symbolgraph_query_latency_seconds",
            "Query latency in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])
    ).expect("Failed to create QUERY_LATENCY histogram");

    // ============================================================================
    // Graph metrics
    // ============================================================================

    /// Files in the most recently built graph
    pub static ref GRAPH_FILES: Gauge = Gauge::with_opts(
        Opts::new(
            "symbolgraph_graph_files",
            "Number of files in the loaded symbol graph"
        )
    ).expect("Failed to create GRAPH_FILES gauge");

    /// Defined symbols in the most recently built graph
    pub static ref GRAPH_SYMBOLS: Gauge = Gauge::with_opts(
        Opts::new(
            "symbolgraph_graph_symbols",
            "Number of defined symbols in the loaded symbol graph"
        )
    ).expect("Failed to create GRAPH_SYMBOLS gauge");

    // ============================================================================
    // Rank and search metrics
    // ============================================================================

    /// Power iterations needed per rank computation
    pub static ref RANK_ITERATIONS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "symbolgraph_rank_iterations",
            "Power iterations per symbol rank computation"
        ).buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])
    ).expect("Failed to create RANK_ITERATIONS histogram");

    /// Total exact-search matches returned
    pub static ref EXACT_MATCHES: Counter = Counter::with_opts(
        Opts::new(
            "symbolgraph_exact_matches_total",
            "Total number of exact search matches"
        )
    ).expect("Failed to create EXACT_MATCHES counter");

    /// Files rewritten by replace
    pub static ref REPLACE_FILES_WRITTEN: Counter = Counter::with_opts(
        Opts::new(
            "symbolgraph_replace_files_written_total",
            "Total number of files rewritten by replace"
        )
    ).expect("Failed to create REPLACE_FILES_WRITTEN counter");
}

/// Register all metrics with the global registry
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(QUERY_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(QUERY_ERRORS.clone()))?;
    REGISTRY.register(Box::new(QUERY_LATENCY.clone()))?;
    REGISTRY.register(Box::new(GRAPH_FILES.clone()))?;
    REGISTRY.register(Box::new(GRAPH_SYMBOLS.clone()))?;
    REGISTRY.register(Box::new(RANK_ITERATIONS.clone()))?;
    REGISTRY.register(Box::new(EXACT_MATCHES.clone()))?;
    REGISTRY.register(Box::new(REPLACE_FILES_WRITTEN.clone()))?;
    Ok(())
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Current metric values for the CLI `stats` command
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub query_requests_total: f64,
    pub query_errors_total: f64,
    pub query_latency_avg: f64,
    pub graph_files: f64,
    pub graph_symbols: f64,
    pub rank_iterations_avg: f64,
    pub exact_matches_total: f64,
    pub replace_files_written_total: f64,
}

impl MetricSnapshot {
    pub fn capture() -> Self {
        Self {
            query_requests_total: QUERY_REQUESTS.get(),
            query_errors_total: QUERY_ERRORS.get(),
            query_latency_avg: calculate_histogram_avg(&QUERY_LATENCY),
            graph_files: GRAPH_FILES.get(),
            graph_symbols: GRAPH_SYMBOLS.get(),
            rank_iterations_avg: calculate_histogram_avg(&RANK_ITERATIONS),
            exact_matches_total: EXACT_MATCHES.get(),
            replace_files_written_total: REPLACE_FILES_WRITTEN.get(),
        }
    }
}

fn calculate_histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}
