//! Exact search and dry-run replace benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use symbolgraph::search::{FsSourceProvider, SymbolSearcher};
use symbolgraph::SymbolGraph;

const PREFIX: &str = "scip-python python bench 1.0";

/// Write `count` Python files of roughly `lines` lines plus a matching index
fn generate_project(dir: &Path, count: usize, lines: usize) -> SymbolSearcher {
    let mut documents = Vec::new();
    for i in 0..count {
        let mut content = String::new();
        let mut occurrences = Vec::new();
        let mut line = 0u32;
        while (line as usize) < lines {
            let name = format!("handler_{}", line);
            content.push_str(&format!("def {}(request):\n", name));
            content.push_str("    payload = parse_request(request)\n");
            content.push_str("    return render(payload)\n\n");
            occurrences.push(json!({
                "symbol_uri": format!("{} `module{}`/{}().", PREFIX, i, name),
                "range": [line, 4, 4 + name.len()],
                "enclosing_range": [line, 0, line + 3, 0],
                "roles": 1
            }));
            line += 4;
        }
        fs::write(dir.join(format!("module{}.py", i)), content).expect("write source");
        documents.push(json!({
            "relative_path": format!("module{}.py", i),
            "occurrences": occurrences,
        }));
    }

    let index_path = dir.join("index.json");
    fs::write(&index_path, json!({ "documents": documents }).to_string()).expect("write index");
    let graph = SymbolGraph::load(&index_path).expect("index loads");
    SymbolSearcher::new(Arc::new(graph), Arc::new(FsSourceProvider::new(dir)))
}

fn bench_exact_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_search");
    group.sample_size(20);

    for &files in &[10, 100, 500] {
        let dir = tempdir().expect("tempdir");
        let searcher = generate_project(dir.path(), files, 400);

        group.bench_with_input(BenchmarkId::new("payload", files), &searcher, |b, searcher| {
            b.iter(|| black_box(searcher.exact_search("payload").expect("search")));
        });
        group.bench_with_input(BenchmarkId::new("absent", files), &searcher, |b, searcher| {
            b.iter(|| black_box(searcher.exact_search("no_such_text").expect("search")));
        });
    }

    group.finish();
}

fn bench_replace_dry_run(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let searcher = generate_project(dir.path(), 100, 400);

    c.bench_function("replace_dry_run_100_files", |b| {
        b.iter(|| black_box(searcher.replace("render", "draw", false).expect("replace")));
    });
}

criterion_group!(benches, bench_exact_search, bench_replace_dry_run);
criterion_main!(benches);
