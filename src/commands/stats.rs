//! Stats command for displaying graph statistics and metrics

use anyhow::Result;

use super::Workspace;
use crate::metrics::{gather_metrics, MetricSnapshot};

/// Run the stats command
///
/// # Arguments
/// * `prometheus` - If true, output in Prometheus text format
pub fn run(workspace: &Workspace, prometheus: bool) -> Result<()> {
    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let graph = &workspace.graph;
    let occurrences: usize = graph
        .get_all_files()
        .iter()
        .map(|f| f.occurrences.len())
        .sum();
    let referenced = graph.referenced_symbols().count();
    let external = graph
        .referenced_symbols()
        .filter(|(symbol, _)| !graph.is_defined(symbol))
        .count();

    println!("Symbol Graph Statistics");
    println!("=======================\n");

    println!("Index Contents:");
    println!("  Files:              {}", graph.get_all_files().len());
    println!("  Occurrences:        {}", occurrences);
    println!("  Defined symbols:    {}", graph.get_all_defined_symbols().len());
    println!("  Referenced symbols: {}", referenced);
    println!("  External symbols:   {}", external);
    println!();

    let report = graph.report();
    println!("Load Warnings: {}", report.warnings.len());
    for (stage, warnings) in report.by_stage() {
        println!("  {}: {}", stage, warnings.len());
    }
    println!();

    let snapshot = MetricSnapshot::capture();
    println!("Query Metrics:");
    println!("  Total queries:   {:.0}", snapshot.query_requests_total);
    println!("  Failed queries:  {:.0}", snapshot.query_errors_total);
    if snapshot.query_requests_total > 0.0 {
        println!("  Average latency: {:.3}s", snapshot.query_latency_avg);
    }

    Ok(())
}
